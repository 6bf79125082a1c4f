use super::AddressSample;

/// Shift/mask triple for sockets reached through the interconnect adapter.
///
/// The adapter routes the address lines in a different physical order than
/// the chip pin-out, so the low, middle and high runs are pulled out of the
/// raw sample separately and put back at their chip positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InterconnectWiring {
    pub low_mask: u32,
    pub mid_shift: u32,
    pub mid_mask: u32,
    pub high_shift: u32,
    pub high_mask: u32,
}

impl InterconnectWiring {
    #[inline(always)]
    fn decode(&self, sample: AddressSample) -> u32 {
        (sample.low & self.low_mask)
            | ((sample.low >> self.mid_shift) & self.mid_mask)
            | ((sample.high << self.high_shift) & self.high_mask)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeRule {
    /// Chips addressed entirely by A0-A15
    Direct { mask: u32 },

    /// Chips that also need A16-A19 from the second port word
    Wide {
        high_mask: u32,
        interconnect: Option<InterconnectWiring>,
    },
}

/*
    Native wide decode, second port word:

    31      8 7  4 3  0
    --------- ---- ----
    xxxx xxxx AAAA xxxx
              ||||
              ++++- A16-A19, shifted up by 12 to land on bits 16-19
*/
const WIDE_HIGH_SHIFT: u32 = 12;

impl DecodeRule {
    #[inline(always)]
    pub fn decode(&self, sample: AddressSample, interconnect: bool) -> u32 {
        match *self {
            DecodeRule::Direct { mask } => sample.low & mask,
            DecodeRule::Wide {
                interconnect: Some(wiring),
                ..
            } if interconnect => wiring.decode(sample),
            DecodeRule::Wide { high_mask, .. } => {
                (sample.low & 0xFFFF) | ((sample.high << WIDE_HIGH_SHIFT) & high_mask)
            }
        }
    }
}
