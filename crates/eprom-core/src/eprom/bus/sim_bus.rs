use super::{BusPort, DataLanes};
use crate::eprom::chip::AddressSample;

enum Pattern {
    Script { samples: Vec<AddressSample>, cursor: usize },
    Sweep { next: u32, size: u32 },
}

/// Socket stand-in for hosts without real pins.
///
/// Replays a fixed list of samples, or walks a linear address range the way
/// a CPU fetching sequentially would. Driven bytes land in `data_register`.
pub struct SimBus {
    pattern: Pattern,
    pub data_register: DataLanes,
    pub cycles: u64,
}

impl SimBus {
    /// Replays `samples` in order, wrapping at the end
    pub fn new(samples: Vec<AddressSample>) -> SimBus {
        SimBus {
            pattern: Pattern::Script { samples, cursor: 0 },
            data_register: DataLanes::all(),
            cycles: 0,
        }
    }

    /// Walks addresses `0..size` with native wiring, wrapping at the end
    pub fn sweep(size: usize) -> SimBus {
        SimBus {
            pattern: Pattern::Sweep {
                next: 0,
                size: size.max(1) as u32,
            },
            data_register: DataLanes::all(),
            cycles: 0,
        }
    }

    pub fn last_byte(&self) -> u8 {
        self.data_register.to_byte()
    }
}

impl BusPort for SimBus {
    fn sample_address_bus(&mut self) -> AddressSample {
        match &mut self.pattern {
            Pattern::Script { samples, cursor } => {
                if samples.is_empty() {
                    return AddressSample::default();
                }
                let sample = samples[*cursor];
                *cursor = (*cursor + 1) % samples.len();
                sample
            }
            Pattern::Sweep { next, size } => {
                let sample = AddressSample::from_linear(*next);
                *next = (*next + 1) % *size;
                sample
            }
        }
    }

    fn drive_data_bus(&mut self, value: u8) {
        self.data_register = DataLanes::from_byte(value);
        self.cycles += 1;
    }
}
