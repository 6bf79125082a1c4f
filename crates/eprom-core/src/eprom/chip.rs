use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

pub mod wiring;

use super::error::EpromError;
use wiring::{DecodeRule, InterconnectWiring};

/// Raw snapshot of the address bus.
///
/// `low` carries A0-A15 in bits 0-15. `high` is the port word that carries
/// A16-A19 in bits 4-7; its other bits belong to unrelated pins and are masked
/// off during decode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressSample {
    pub low: u32,
    pub high: u32,
}

impl AddressSample {
    pub fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    /// Sample that a natively wired socket presents for a linear address
    pub fn from_linear(addr: u32) -> Self {
        Self {
            low: addr & 0xFFFF,
            high: ((addr >> 16) & 0x0F) << 4,
        }
    }
}

/// Emulated chip types, keyed by the identifier byte used on the wire.
///
/// The 27080 (id 11) is not listed: 1 MiB does not fit in the image store.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChipType {
    // 24 pin
    M2708 = 1,
    M2716 = 2,
    M2732 = 3,

    // 28 pin
    M2764 = 4,
    M27128 = 5,
    M27256 = 6,
    M27512 = 7,

    // 32 pin
    M27010 = 8,
    M27020 = 9,
    M27040 = 10,
}

pub const DEFAULT_CHIP: ChipType = ChipType::M27040;

#[derive(Debug)]
pub struct ChipGeometry {
    pub chip: ChipType,
    pub name: &'static str,
    pub size: usize,
    pub rule: DecodeRule,
}

impl ChipGeometry {
    /// Linear offset in `[0, size)` for a raw bus sample
    #[inline(always)]
    pub fn decode(&self, sample: AddressSample, interconnect: bool) -> usize {
        self.rule.decode(sample, interconnect) as usize
    }

    pub fn supports_interconnect(&self) -> bool {
        matches!(
            self.rule,
            DecodeRule::Wide {
                interconnect: Some(_),
                ..
            }
        )
    }
}

const fn direct(chip: ChipType, name: &'static str, size: usize) -> ChipGeometry {
    ChipGeometry {
        chip,
        name,
        size,
        rule: DecodeRule::Direct {
            mask: (size - 1) as u32,
        },
    }
}

pub static CHIP_GEOMETRIES: [ChipGeometry; 10] = [
    direct(ChipType::M2708, "2708", 1024),
    direct(ChipType::M2716, "2716", 2 * 1024),
    direct(ChipType::M2732, "2732", 4 * 1024),
    direct(ChipType::M2764, "2764", 8 * 1024),
    direct(ChipType::M27128, "27128", 16 * 1024),
    direct(ChipType::M27256, "27256", 32 * 1024),
    direct(ChipType::M27512, "27512", 64 * 1024),
    ChipGeometry {
        chip: ChipType::M27010,
        name: "27010",
        size: 128 * 1024,
        rule: DecodeRule::Wide {
            high_mask: 0x10000,
            interconnect: Some(InterconnectWiring {
                low_mask: 0x001FF,
                mid_shift: 2,
                mid_mask: 0x03E00,
                high_shift: 10,
                high_mask: 0x1C000,
            }),
        },
    },
    ChipGeometry {
        chip: ChipType::M27020,
        name: "27020",
        size: 256 * 1024,
        rule: DecodeRule::Wide {
            high_mask: 0x30000,
            interconnect: Some(InterconnectWiring {
                low_mask: 0x003FF,
                mid_shift: 1,
                mid_mask: 0x07C00,
                high_shift: 11,
                high_mask: 0x38000,
            }),
        },
    },
    ChipGeometry {
        chip: ChipType::M27040,
        name: "27040",
        size: 512 * 1024,
        rule: DecodeRule::Wide {
            high_mask: 0x70000,
            // 2048 byte pages: lines land where the native pin-out puts them
            interconnect: Some(InterconnectWiring {
                low_mask: 0x007FF,
                mid_shift: 0,
                mid_mask: 0x0F800,
                high_shift: 12,
                high_mask: 0x70000,
            }),
        },
    },
];

pub static GEOMETRY_MAP: Lazy<HashMap<u8, &'static ChipGeometry>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for geometry in CHIP_GEOMETRIES.iter() {
        map.insert(geometry.chip as u8, geometry);
    }
    map
});

impl ChipType {
    pub const ALL: [ChipType; 10] = [
        ChipType::M2708,
        ChipType::M2716,
        ChipType::M2732,
        ChipType::M2764,
        ChipType::M27128,
        ChipType::M27256,
        ChipType::M27512,
        ChipType::M27010,
        ChipType::M27020,
        ChipType::M27040,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn geometry(self) -> &'static ChipGeometry {
        let index = match self {
            ChipType::M2708 => 0,
            ChipType::M2716 => 1,
            ChipType::M2732 => 2,
            ChipType::M2764 => 3,
            ChipType::M27128 => 4,
            ChipType::M27256 => 5,
            ChipType::M27512 => 6,
            ChipType::M27010 => 7,
            ChipType::M27020 => 8,
            ChipType::M27040 => 9,
        };
        &CHIP_GEOMETRIES[index]
    }

    pub fn size(self) -> usize {
        self.geometry().size
    }
}

impl TryFrom<u8> for ChipType {
    type Error = EpromError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        GEOMETRY_MAP
            .get(&id)
            .map(|geometry| geometry.chip)
            .ok_or(EpromError::UnsupportedChip(id))
    }
}

impl fmt::Display for ChipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.geometry().name)
    }
}
