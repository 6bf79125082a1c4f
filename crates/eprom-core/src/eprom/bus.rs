use bitflags::bitflags;

pub mod sim_bus;

use super::chip::AddressSample;

/// Adapter between the emulation loop and the physical socket.
///
/// Implementations are the only code that touches pin registers.
pub trait BusPort {
    fn sample_address_bus(&mut self) -> AddressSample;
    fn drive_data_bus(&mut self, value: u8);
}

bitflags! {
    /* Data lanes on the 32-bit output register:

        31     20 19  16 15      4 3  0
        -------- ------ --------- ----
        xxxx xxxx DDDD  xxxx xxxx DDDD
                  ||||            ||||
                  ||||            ++++- D0-D3
                  ++++----------------- D4-D7

       Other bits of the register drive unrelated pins.
     */
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct DataLanes: u32 {
        const D0 = 1 << 0;
        const D1 = 1 << 1;
        const D2 = 1 << 2;
        const D3 = 1 << 3;
        const D4 = 1 << 16;
        const D5 = 1 << 17;
        const D6 = 1 << 18;
        const D7 = 1 << 19;
    }
}

impl DataLanes {
    #[inline(always)]
    pub fn from_byte(value: u8) -> Self {
        let value = value as u32;
        DataLanes::from_bits_retain((value & 0x0F) | ((value & 0xF0) << 12))
    }

    #[inline(always)]
    pub fn to_byte(self) -> u8 {
        let bits = self.bits();
        ((bits & 0x0F) | ((bits >> 12) & 0xF0)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_expands_to_split_lanes() {
        assert_eq!(DataLanes::from_byte(0xA5).bits(), 0x000A_0005);
        assert_eq!(DataLanes::from_byte(0xFF), DataLanes::all());
        assert_eq!(DataLanes::from_byte(0x00), DataLanes::empty());
        assert_eq!(
            DataLanes::from_byte(0x81),
            DataLanes::D0 | DataLanes::D7
        );
    }

    #[test]
    fn test_lanes_collapse_back_to_byte() {
        for value in 0..=0xFFu8 {
            assert_eq!(DataLanes::from_byte(value).to_byte(), value);
        }
    }

    #[test]
    fn test_unrelated_register_bits_are_ignored() {
        let lanes = DataLanes::from_bits_retain(0xFFF0_FFF0 | 0x0003_0003);
        assert_eq!(lanes.to_byte(), 0x33);
    }
}
