//! Convenient imports for consumers of eprom-core
//!
//! Pull in everything commonly needed in one line:
//! ```rust
//! use eprom_core::prelude::*;
//! ```

// Main emulator API
pub use crate::eprom::{Eprom, RunState};
pub use crate::eprom::chip::{AddressSample, ChipGeometry, ChipType};
pub use crate::eprom::error::EpromError;
pub use crate::eprom::loader::{LoadConfig, LoadReport};
pub use crate::eprom::rom_image::{BANK_CAPACITY, Bank, ERASED_BYTE, RomImage};
pub use crate::eprom::settings::Settings;

// Traits that hosts implement
pub use crate::eprom::bus::BusPort;
pub use crate::eprom::storage::Storage;
pub use crate::eprom::transport::Transport;

// Stock implementations
pub use crate::eprom::bus::DataLanes;
pub use crate::eprom::bus::sim_bus::SimBus;
pub use crate::eprom::storage::dir_storage::DirStorage;
pub use crate::eprom::storage::mem_storage::MemStorage;
pub use crate::eprom::storage::{StorageKind, StorageSelector};
pub use crate::eprom::transport::script::ScriptedTransport;

// Macros
pub use crate::trace_dump;
