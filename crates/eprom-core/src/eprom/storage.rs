use std::fmt;
use std::io;

pub mod dir_storage;
pub mod mem_storage;

/// File-level access to one persistence medium.
///
/// Removing a file that does not exist is not an error.
pub trait Storage: Send {
    /// Media presence. Fixed media are always present.
    fn is_present(&self) -> bool {
        true
    }

    fn exists(&self, name: &str) -> bool;

    /// Read up to `buf.len()` bytes from the start of `name`
    fn read(&mut self, name: &str, buf: &mut [u8]) -> io::Result<usize>;

    /// Replace `name` with exactly `data`
    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()>;

    fn remove(&mut self, name: &str) -> io::Result<()>;
}

/// Where images are persisted. The discriminant is the acknowledgement byte
/// sent back to the remote sender.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Removable = 1,
    Flash = 2,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Removable => write!(f, "removable media"),
            StorageKind::Flash => write!(f, "on-board flash"),
        }
    }
}

impl TryFrom<u8> for StorageKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(StorageKind::Removable),
            2 => Ok(StorageKind::Flash),
            other => Err(other),
        }
    }
}

/// Picks the removable medium when it is present, on-board flash otherwise.
///
/// The choice only changes when `select` runs again.
pub struct StorageSelector {
    removable: Box<dyn Storage>,
    flash: Box<dyn Storage>,
    kind: StorageKind,
}

impl StorageSelector {
    pub fn new(removable: Box<dyn Storage>, flash: Box<dyn Storage>) -> Self {
        let mut selector = Self {
            removable,
            flash,
            kind: StorageKind::Flash,
        };
        selector.select();
        selector
    }

    /// Check media presence and switch backends accordingly
    pub fn select(&mut self) -> StorageKind {
        self.kind = if self.removable.is_present() {
            StorageKind::Removable
        } else {
            StorageKind::Flash
        };
        self.kind
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    pub fn active(&mut self) -> &mut dyn Storage {
        self.backend_mut(self.kind)
    }

    pub fn backend_mut(&mut self, kind: StorageKind) -> &mut dyn Storage {
        match kind {
            StorageKind::Removable => self.removable.as_mut(),
            StorageKind::Flash => self.flash.as_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mem_storage::MemStorage;
    use super::*;

    #[test]
    fn test_selects_removable_media_when_present() {
        let card = MemStorage::removable();
        let flash = MemStorage::new();
        let mut selector = StorageSelector::new(Box::new(card.clone()), Box::new(flash.clone()));

        assert_eq!(selector.kind(), StorageKind::Removable);
        selector.active().write("a.bin", &[1]).unwrap();
        assert!(card.exists("a.bin"));
        assert!(!flash.exists("a.bin"));
    }

    #[test]
    fn test_falls_back_to_flash_without_media() {
        let card = MemStorage::removable();
        card.set_present(false);
        let flash = MemStorage::new();
        let mut selector = StorageSelector::new(Box::new(card.clone()), Box::new(flash.clone()));

        assert_eq!(selector.kind(), StorageKind::Flash);
        selector.active().write("a.bin", &[1]).unwrap();
        assert!(flash.exists("a.bin"));
    }

    #[test]
    fn test_selection_only_changes_on_select() {
        let card = MemStorage::removable();
        let mut selector =
            StorageSelector::new(Box::new(card.clone()), Box::new(MemStorage::new()));
        assert_eq!(selector.kind(), StorageKind::Removable);

        card.set_present(false);
        assert_eq!(selector.kind(), StorageKind::Removable);
        assert_eq!(selector.select(), StorageKind::Flash);

        card.set_present(true);
        assert_eq!(selector.select(), StorageKind::Removable);
    }

    #[test]
    fn test_storage_kind_ack_byte() {
        assert_eq!(StorageKind::Removable as u8, 1);
        assert_eq!(StorageKind::Flash as u8, 2);
        assert_eq!(StorageKind::try_from(2), Ok(StorageKind::Flash));
        assert_eq!(StorageKind::try_from(7), Err(7));
    }
}
