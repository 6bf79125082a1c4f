use std::io;
use std::time::Duration;


use super::chip::{ChipType, DEFAULT_CHIP};
use super::consts::{READ_CHUNK_LEN, READ_TIMEOUT_MS};
use super::error::EpromError;
use super::rom_image::{Bank, ERASED_BYTE, RomImage};
use super::settings::Settings;
use super::storage::{Storage, StorageKind, StorageSelector};
use super::tracer::{Phase, Traceable};
use super::transport::Transport;
use crate::{trace_load_event, trace_obj};
use log::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoadConfig {
    /// Largest single read from the transport
    pub chunk_len: usize,

    /// Idle window for one read. A read that gets nothing within it ends the
    /// current bank. There is no abort: a bank that never goes idle keeps
    /// reading until it is full.
    pub read_timeout: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            chunk_len: READ_CHUNK_LEN,
            read_timeout: Duration::from_millis(READ_TIMEOUT_MS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub storage: StorageKind,
    pub settings: Settings,
    pub lo_len: usize,
    pub hi_len: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.lo_len + self.hi_len
    }
}

/// Progress of one bank while it is being received
#[derive(Debug)]
pub struct LoadSession {
    pub bank: Bank,
    pub target: usize,
    pub received: usize,
}

impl LoadSession {
    fn new(bank: Bank, target: usize) -> Self {
        Self {
            bank,
            target,
            received: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.received >= self.target
    }
}

impl Traceable for LoadSession {
    fn trace_phase(&self) -> Phase {
        Phase::Bank
    }

    fn trace_line(&self) -> Option<String> {
        Some(format!("{:?} {}/{}", self.bank, self.received, self.target))
    }
}

/// Header of a load once it has been accepted and persisted
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoadHeader {
    pub settings: Settings,
    pub storage: StorageKind,
}

/// Receive a new image from `transport`, replacing both banks and the
/// persisted copy on whichever medium is selected.
///
/// Wire format: chip identifier byte, interconnect flag byte, then the image
/// bytes. The low bank fills first; the high bank takes whatever follows. The
/// storage acknowledgement byte is sent once the header is in.
///
/// Storage failures are logged and do not stop the transfer. A transport
/// failure ends it with the banks as far as they got.
pub fn receive_image<T: Transport + ?Sized>(
    transport: &mut T,
    image: &mut RomImage,
    storage: &mut StorageSelector,
    config: &LoadConfig,
) -> Result<LoadReport, EpromError> {
    let header = receive_header(transport, storage, config)?;
    let (lo_len, hi_len) = receive_banks(transport, image, storage, config)?;
    Ok(LoadReport {
        storage: header.storage,
        settings: header.settings,
        lo_len,
        hi_len,
    })
}

/// Read the two header bytes, pick the medium, acknowledge it and persist the
/// new settings. From here on the persisted record describes the new image.
pub fn receive_header<T: Transport + ?Sized>(
    transport: &mut T,
    storage: &mut StorageSelector,
    config: &LoadConfig,
) -> Result<LoadHeader, EpromError> {
    let chip_id = transport.read_byte(config.read_timeout)?.ok_or_else(|| {
        io::Error::new(io::ErrorKind::UnexpectedEof, "missing chip identifier")
    })?;
    let interconnect = match transport.read_byte(config.read_timeout)? {
        Some(flag) => flag != 0,
        None => {
            warn!("Interconnect flag missing, assuming off");
            false
        }
    };
    let chip = ChipType::try_from(chip_id).unwrap_or_else(|e| {
        warn!("{}, falling back to {}", e, DEFAULT_CHIP);
        DEFAULT_CHIP
    });
    let settings = Settings::new(chip, interconnect);

    let kind = storage.select();
    transport.write_byte(kind as u8)?;
    transport.flush()?;
    info!(
        "Receiving image for {} (interconnect {}), saving to {}",
        chip,
        if interconnect { "on" } else { "off" },
        kind
    );
    trace_load_event!(Header, "id={} flag={} ack={}", chip_id, interconnect as u8, kind as u8);
    trace_obj!(&settings);

    if let Err(e) = settings.save(storage.active()) {
        warn!("{}", e);
    }

    Ok(LoadHeader {
        settings,
        storage: kind,
    })
}

/// Drain the low bank, then the high bank, persisting each as it completes.
pub fn receive_banks<T: Transport + ?Sized>(
    transport: &mut T,
    image: &mut RomImage,
    storage: &mut StorageSelector,
    config: &LoadConfig,
) -> Result<(usize, usize), EpromError> {
    let lo_len = receive_bank(transport, image, storage.active(), Bank::Lo, config)?;
    let hi_len = receive_bank(transport, image, storage.active(), Bank::Hi, config)?;
    info!(
        "Image received: {} bytes (lo {}, hi {})",
        lo_len + hi_len,
        lo_len,
        hi_len
    );
    Ok((lo_len, hi_len))
}

/// A bank cut short by a link failure is still persisted as far as it got, so
/// the medium matches what is being served.
fn receive_bank<T: Transport + ?Sized>(
    transport: &mut T,
    image: &mut RomImage,
    storage: &mut dyn Storage,
    bank: Bank,
    config: &LoadConfig,
) -> Result<usize, EpromError> {
    let buffer = image.bank_mut(bank);
    let mut session = LoadSession::new(bank, buffer.len());
    let chunk_len = config.chunk_len.max(1);

    buffer.fill(ERASED_BYTE);
    let mut failure = None;
    while !session.is_full() {
        let end = (session.received + chunk_len).min(session.target);
        match transport.read_bytes(&mut buffer[session.received..end], config.read_timeout) {
            Ok(0) => break,
            Ok(n) => session.received += n,
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    debug!("Bank {:?} done after {} bytes", bank, session.received);
    trace_obj!(&session);

    persist_bank(storage, bank, &buffer[..session.received]);
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(session.received),
    }
}

/// Drop the old file and write exactly the bytes received, even none
fn persist_bank(storage: &mut dyn Storage, bank: Bank, data: &[u8]) {
    let name = bank.file_name();
    if let Err(e) = storage.remove(name) {
        warn!("{}", EpromError::storage(name, e));
    }
    if let Err(e) = storage.write(name, data) {
        warn!("{}", EpromError::storage(name, e));
    }
    trace_load_event!(Persist, "{} {} bytes", name, data.len());
}
