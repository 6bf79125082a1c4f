pub const FILE_LO: &str = "romLo.bin";
pub const FILE_HI: &str = "romHi.bin";
pub const FILE_SETTINGS: &str = "settings.bin";

pub const SETTINGS_MAGIC: u32 = 0xDEAD_BEEF;
pub const SETTINGS_RECORD_LEN: usize = 8;

pub const READ_CHUNK_LEN: usize = 1024;
pub const READ_TIMEOUT_MS: u64 = 1000;
