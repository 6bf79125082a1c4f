// EPROM emulator core modules
pub mod eprom;
pub mod prelude;

// Re-exports
pub use eprom::Eprom;

pub use eprom::chip::{ChipGeometry, ChipType};
pub use eprom::error::EpromError;
