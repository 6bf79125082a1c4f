use super::chip::{ChipGeometry, ChipType, DEFAULT_CHIP};
use super::consts::{FILE_SETTINGS, SETTINGS_MAGIC, SETTINGS_RECORD_LEN};
use super::error::EpromError;
use super::storage::Storage;
use super::tracer::{Phase, Traceable};
use log::{debug, warn};

/*
    Settings record, 8 bytes:

    0       4    5    6    8
    +-------+----+----+----+
    | magic | id | ic | 00 |
    +-------+----+----+----+

    magic - 0xDEADBEEF, little-endian
    id    - chip identifier
    ic    - interconnect mode, non-zero = on
*/

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub chip: ChipType,
    pub interconnect: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chip: DEFAULT_CHIP,
            interconnect: false,
        }
    }
}

impl Settings {
    pub fn new(chip: ChipType, interconnect: bool) -> Self {
        Self { chip, interconnect }
    }

    pub fn geometry(&self) -> &'static ChipGeometry {
        self.chip.geometry()
    }

    pub fn to_record(&self) -> [u8; SETTINGS_RECORD_LEN] {
        let mut record = [0u8; SETTINGS_RECORD_LEN];
        record[0..4].copy_from_slice(&SETTINGS_MAGIC.to_le_bytes());
        record[4] = self.chip.id();
        record[5] = self.interconnect as u8;
        record
    }

    /// `None` unless the magic matches and the chip identifier is known
    pub fn from_record(record: &[u8]) -> Option<Settings> {
        if record.len() < SETTINGS_RECORD_LEN {
            return None;
        }
        let magic = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        if magic != SETTINGS_MAGIC {
            return None;
        }
        let chip = ChipType::try_from(record[4]).ok()?;
        Some(Settings {
            chip,
            interconnect: record[5] != 0,
        })
    }

    /// Read the persisted record, falling back to defaults when it is
    /// missing, short or carries the wrong magic.
    pub fn load(storage: &mut dyn Storage) -> Settings {
        if !storage.exists(FILE_SETTINGS) {
            debug!("No settings record, using defaults");
            return Settings::default();
        }

        let mut record = [0xFFu8; SETTINGS_RECORD_LEN];
        let settings = match storage.read(FILE_SETTINGS, &mut record) {
            Ok(n) => Settings::from_record(&record[..n]),
            Err(e) => {
                warn!("Failed to read settings record: {}", e);
                None
            }
        };

        settings.unwrap_or_else(|| {
            warn!("Settings record rejected, using defaults");
            Settings::default()
        })
    }

    /// Stamp the magic and overwrite the persisted record
    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), EpromError> {
        storage
            .write(FILE_SETTINGS, &self.to_record())
            .map_err(|e| EpromError::storage(FILE_SETTINGS, e))
    }
}

impl Traceable for Settings {
    fn trace_phase(&self) -> Phase {
        Phase::Header
    }

    fn trace_line(&self) -> Option<String> {
        Some(format!("settings chip={} interconnect={}", self.chip, self.interconnect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eprom::storage::mem_storage::MemStorage;

    #[test]
    fn test_save_then_load_round_trips() {
        let mut storage = MemStorage::new();
        let settings = Settings::new(ChipType::M27010, true);
        settings.save(&mut storage).unwrap();

        assert_eq!(Settings::load(&mut storage), settings);
    }

    #[test]
    fn test_record_layout() {
        let record = Settings::new(ChipType::M27020, true).to_record();
        assert_eq!(record, [0xEF, 0xBE, 0xAD, 0xDE, 9, 1, 0, 0]);
    }

    #[test]
    fn test_corrupt_magic_loads_defaults() {
        let mut storage = MemStorage::new();
        let mut record = Settings::new(ChipType::M2716, true).to_record();
        record[2] ^= 0x01;
        storage.insert(FILE_SETTINGS, &record);

        assert_eq!(Settings::load(&mut storage), Settings::default());
    }

    #[test]
    fn test_unknown_chip_loads_defaults() {
        let mut storage = MemStorage::new();
        let mut record = Settings::default().to_record();
        record[4] = 11;
        storage.insert(FILE_SETTINGS, &record);

        assert_eq!(Settings::load(&mut storage), Settings::default());
    }

    #[test]
    fn test_torn_record_loads_defaults() {
        let mut storage = MemStorage::new();
        let record = Settings::new(ChipType::M2764, false).to_record();
        storage.insert(FILE_SETTINGS, &record[..5]);

        assert_eq!(Settings::load(&mut storage), Settings::default());
    }

    #[test]
    fn test_missing_record_loads_defaults() {
        let mut storage = MemStorage::new();
        let settings = Settings::load(&mut storage);
        assert_eq!(settings.chip, ChipType::M27040);
        assert!(!settings.interconnect);
    }

    #[test]
    fn test_any_nonzero_flag_means_interconnect() {
        let mut record = Settings::new(ChipType::M27020, false).to_record();
        record[5] = 0x80;
        assert_eq!(
            Settings::from_record(&record),
            Some(Settings::new(ChipType::M27020, true))
        );
    }
}
