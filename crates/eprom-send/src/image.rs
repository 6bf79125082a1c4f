use crate::lnx::{LNX_HEADER_LEN, LnxHeader};
use eprom_core::ChipType;
use eprom_core::prelude::ERASED_BYTE;
use thiserror::Error;

/// Largest chip the sender knows about (27080). The emulator itself stops at
/// the 27040, so a 27080 image is only useful to other receivers.
pub const MAX_CHIP_ID: u8 = 11;
const M27080_SIZE: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("Invalid EPROM type {0}, expected 1 to 11")]
    UnsupportedType(u8),

    #[error("File is too large for the {chip}: {len} bytes, at most {max}")]
    TooLarge {
        chip: String,
        len: usize,
        max: usize,
    },

    #[error("Cannot skip {skip} bytes of a {len} byte file")]
    SkipPastEnd { skip: usize, len: usize },

    #[error("Unsupported LNX page size: {0}")]
    UnsupportedPageSize(i16),
}

/// Address space of a chip type, 27080 included
pub fn chip_size(id: u8) -> Result<usize, ImageError> {
    match id {
        MAX_CHIP_ID => Ok(M27080_SIZE),
        _ => ChipType::try_from(id)
            .map(ChipType::size)
            .map_err(|_| ImageError::UnsupportedType(id)),
    }
}

fn chip_name(id: u8) -> String {
    ChipType::try_from(id)
        .map(|chip| chip.to_string())
        .unwrap_or_else(|_| "27080".into())
}

/// What goes down the link: the two header bytes, then `bytes`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub chip_id: u8,
    pub interconnect: bool,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn header(&self) -> [u8; 2] {
        [self.chip_id, self.interconnect as u8]
    }

    /// A plain binary dump. The whole file must fit the chip; `skip` drops
    /// leading bytes such as a loader header.
    pub fn from_raw(
        raw: &[u8],
        chip_id: u8,
        skip: usize,
        interconnect: bool,
    ) -> Result<Payload, ImageError> {
        let max = chip_size(chip_id)?;
        if raw.len() > max {
            return Err(ImageError::TooLarge {
                chip: chip_name(chip_id),
                len: raw.len(),
                max,
            });
        }
        if skip > raw.len() {
            return Err(ImageError::SkipPastEnd {
                skip,
                len: raw.len(),
            });
        }

        Ok(Payload {
            chip_id,
            interconnect,
            bytes: raw[skip..].to_vec(),
        })
    }

    /// A Lynx `.lnx` cart. The page size picks the chip, interconnect wiring is
    /// always on, and a short bank is padded out to its full size.
    pub fn from_lnx(raw: &[u8]) -> Result<(LnxHeader, Payload), ImageError> {
        let header = LnxHeader::parse(raw)?;
        let chip_id = header.chip_id()?;

        let mut bytes = raw[LNX_HEADER_LEN..].to_vec();
        let bank_len = header.bank0_len();
        if bytes.len() > bank_len {
            return Err(ImageError::TooLarge {
                chip: chip_name(chip_id),
                len: bytes.len(),
                max: bank_len,
            });
        }
        bytes.resize(bank_len, ERASED_BYTE);

        Ok((
            header,
            Payload {
                chip_id,
                interconnect: true,
                bytes,
            },
        ))
    }
}
