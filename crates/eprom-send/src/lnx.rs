use crate::image::ImageError;

const LNX_MAGIC_BYTES: &[u8; 4] = b"LYNX";
pub const LNX_HEADER_LEN: usize = 64;

/// Pages per bank on a Lynx cart
pub const LNX_PAGES: usize = 256;

/*
    LNX header, 64 bytes, little-endian:

    0      4      6      8     10           42          58   59   60       64
    +------+------+------+------+------------+-----------+----+----+--------+
    | LYNX | pgs0 | pgs1 | ver  | cart name  | manuf.    | rot| 00 | spare  |
    +------+------+------+------+------------+-----------+----+----+--------+
*/

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LnxHeader {
    pub page_size_bank0: i16,
    pub page_size_bank1: i16,
    pub version: i16,
    pub cart_name: String,
    pub manufacturer: String,
    pub rotation: u8,
}

pub fn is_lnx(raw: &[u8]) -> bool {
    raw.len() >= LNX_MAGIC_BYTES.len() && &raw[0..4] == LNX_MAGIC_BYTES
}

fn le_i16(raw: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([raw[at], raw[at + 1]])
}

fn text(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

impl LnxHeader {
    pub fn parse(raw: &[u8]) -> Result<LnxHeader, ImageError> {
        if !is_lnx(raw) {
            return Err(ImageError::InvalidFormat("Not an LNX file".into()));
        }
        if raw.len() < LNX_HEADER_LEN {
            return Err(ImageError::InvalidFormat(format!(
                "LNX header truncated at {} bytes",
                raw.len()
            )));
        }

        Ok(LnxHeader {
            page_size_bank0: le_i16(raw, 4),
            page_size_bank1: le_i16(raw, 6),
            version: le_i16(raw, 8),
            cart_name: text(&raw[10..42]),
            manufacturer: text(&raw[42..58]),
            rotation: raw[58],
        })
    }

    /// Chip that holds one bank of this cart
    pub fn chip_id(&self) -> Result<u8, ImageError> {
        match self.page_size_bank0 {
            512 => Ok(8),
            1024 => Ok(9),
            2048 => Ok(10),
            other => Err(ImageError::UnsupportedPageSize(other)),
        }
    }

    pub fn bank0_len(&self) -> usize {
        self.page_size_bank0.max(0) as usize * LNX_PAGES
    }
}

#[cfg(test)]
pub fn build_header(page_size: i16, name: &str) -> Vec<u8> {
    let mut raw = vec![0u8; LNX_HEADER_LEN];
    raw[0..4].copy_from_slice(LNX_MAGIC_BYTES);
    raw[4..6].copy_from_slice(&page_size.to_le_bytes());
    raw[8..10].copy_from_slice(&1i16.to_le_bytes());
    raw[10..10 + name.len()].copy_from_slice(name.as_bytes());
    raw[42..46].copy_from_slice(b"BS42");
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_fields() {
        let raw = build_header(1024, "Chips Challenge");
        let header = LnxHeader::parse(&raw).unwrap();
        assert_eq!(header.page_size_bank0, 1024);
        assert_eq!(header.page_size_bank1, 0);
        assert_eq!(header.version, 1);
        assert_eq!(header.cart_name, "Chips Challenge");
        assert_eq!(header.manufacturer, "BS42");
        assert_eq!(header.chip_id().unwrap(), 9);
        assert_eq!(header.bank0_len(), 256 * 1024);
    }

    #[test]
    fn test_page_size_selects_chip() {
        for (page_size, chip) in [(512, 8), (1024, 9), (2048, 10)] {
            let header = LnxHeader::parse(&build_header(page_size, "x")).unwrap();
            assert_eq!(header.chip_id().unwrap(), chip);
        }
        let header = LnxHeader::parse(&build_header(4096, "x")).unwrap();
        assert!(matches!(
            header.chip_id(),
            Err(ImageError::UnsupportedPageSize(4096))
        ));
    }

    #[test]
    fn test_rejects_bad_magic_and_short_header() {
        assert!(LnxHeader::parse(b"NES\x1a0000").is_err());
        let raw = build_header(512, "x");
        assert!(LnxHeader::parse(&raw[..20]).is_err());
    }
}
