pub mod bus;
pub mod chip;
pub mod consts;
pub mod error;
pub mod loader;
pub mod rom_image;
pub mod settings;
pub mod storage;
pub mod tracer;
pub mod transport;

use crate::trace_boot;
use bus::BusPort;
use loader::{LoadConfig, LoadReport, receive_banks, receive_header};
use log::{debug, error, info, warn};
use rom_image::{Bank, ERASED_BYTE, RomImage};
use settings::Settings;
use storage::{StorageKind, StorageSelector};
use transport::Transport;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Halted,
}

/// The emulated chip: the image being served, how to decode addresses into
/// it, and where it is persisted.
///
/// Serving and loading share one thread. While `step` is inside a load the
/// address bus is not serviced, and the banks are written in place.
pub struct Eprom {
    pub run_state: RunState,
    image: RomImage,
    settings: Settings,
    storage: StorageSelector,
    load_config: LoadConfig,

    pub iterations: u64,
    pub loads: u64,
}

impl Eprom {
    /// Bring the emulator up from whatever the selected medium holds.
    ///
    /// Missing or unreadable files leave the corresponding bank erased and the
    /// settings at their defaults; boot itself never fails.
    pub fn boot(mut storage: StorageSelector, load_config: LoadConfig) -> Self {
        let kind = storage.select();
        let backend = storage.active();
        let settings = Settings::load(backend);

        let mut image = RomImage::new();
        for bank in Bank::ALL {
            let name = bank.file_name();
            if !backend.exists(name) {
                debug!("No {} on {}", name, kind);
                continue;
            }
            match backend.read(name, image.bank_mut(bank)) {
                Ok(n) => debug!("Restored {} bytes from {}", n, name),
                Err(e) => {
                    warn!("Failed to restore {}: {}", name, e);
                    image.erase(bank);
                }
            }
        }

        info!(
            "Booted from {}: {} (interconnect {})",
            kind,
            settings.chip,
            if settings.interconnect { "on" } else { "off" }
        );
        trace_boot!("{} on {}", settings.chip, kind);

        Self {
            run_state: RunState::Running,
            image,
            settings,
            storage,
            load_config,
            iterations: 0,
            loads: 0,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn image(&self) -> &RomImage {
        &self.image
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.storage.kind()
    }

    pub fn load_config(&self) -> &LoadConfig {
        &self.load_config
    }

    /// Serve one bus cycle, then take a pending load if bytes are waiting.
    ///
    /// Returns `true` when a load ran during this step.
    #[inline]
    pub fn step<P, T>(&mut self, port: &mut P, transport: &mut T) -> bool
    where
        P: BusPort + ?Sized,
        T: Transport + ?Sized,
    {
        let sample = port.sample_address_bus();
        let offset = self
            .settings
            .geometry()
            .decode(sample, self.settings.interconnect);
        port.drive_data_bus(self.image.byte_at(offset));
        self.iterations += 1;

        if transport.available() == 0 {
            return false;
        }
        self.load(transport);
        true
    }

    /// Run a load to completion.
    ///
    /// The new settings take over as soon as the header is accepted, because
    /// that is when they are persisted and the banks start being rewritten.
    /// A link failure before that leaves everything as it was.
    pub fn load<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Option<LoadReport> {
        let header = match receive_header(transport, &mut self.storage, &self.load_config) {
            Ok(header) => header,
            Err(e) => {
                error!("Image load failed before the header was in: {}", e);
                return None;
            }
        };
        self.settings = header.settings;

        match receive_banks(
            transport,
            &mut self.image,
            &mut self.storage,
            &self.load_config,
        ) {
            Ok((lo_len, hi_len)) => {
                self.loads += 1;
                Some(LoadReport {
                    storage: header.storage,
                    settings: header.settings,
                    lo_len,
                    hi_len,
                })
            }
            Err(e) => {
                error!("Image load cut short: {}", e);
                None
            }
        }
    }

    /// Drive the erased value until the first sample is serviced
    pub fn park<P: BusPort + ?Sized>(&self, port: &mut P) {
        port.drive_data_bus(ERASED_BYTE);
    }

    /// Serve the bus until halted, or for `limit` iterations when given.
    pub fn run<P, T>(&mut self, port: &mut P, transport: &mut T, limit: Option<u64>)
    where
        P: BusPort + ?Sized,
        T: Transport + ?Sized,
    {
        let mut remaining = limit;
        while self.run_state == RunState::Running {
            if let Some(left) = remaining.as_mut() {
                if *left == 0 {
                    break;
                }
                *left -= 1;
            }
            self.step(port, transport);
        }
    }

    pub fn halt(&mut self) {
        self.run_state = RunState::Halted;
    }
}
