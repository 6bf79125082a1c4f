use super::Storage;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

struct Card {
    files: HashMap<String, Vec<u8>>,
    present: bool,
}

/// In-memory medium. Clones share the same contents, so a caller can keep a
/// handle to inspect or eject a medium after handing it to a selector.
#[derive(Clone)]
pub struct MemStorage {
    card: Arc<Mutex<Card>>,
    removable: bool,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorage {
    /// Fixed medium, always present
    pub fn new() -> Self {
        Self::with_removable(false)
    }

    /// Removable medium, inserted until `set_present(false)`
    pub fn removable() -> Self {
        Self::with_removable(true)
    }

    fn with_removable(removable: bool) -> Self {
        Self {
            card: Arc::new(Mutex::new(Card {
                files: HashMap::new(),
                present: true,
            })),
            removable,
        }
    }

    fn card(&self) -> MutexGuard<'_, Card> {
        self.card.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_present(&self, present: bool) {
        self.card().present = present;
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.card().files.get(name).cloned()
    }

    pub fn insert(&self, name: &str, data: &[u8]) {
        self.card().files.insert(name.to_string(), data.to_vec());
    }
}

impl Storage for MemStorage {
    fn is_present(&self) -> bool {
        !self.removable || self.card().present
    }

    fn exists(&self, name: &str) -> bool {
        self.card().files.contains_key(name)
    }

    fn read(&mut self, name: &str, buf: &mut [u8]) -> io::Result<usize> {
        let card = self.card();
        let data = card
            .files
            .get(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        self.card().files.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> io::Result<()> {
        self.card().files.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut storage = MemStorage::new();
        storage.write("x.bin", &[1, 2, 3]).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(storage.read("x.bin", &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_read_is_bounded_by_buffer() {
        let mut storage = MemStorage::new();
        storage.write("x.bin", &[9; 16]).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(storage.read("x.bin", &mut buf).unwrap(), 4);
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let mut storage = MemStorage::new();
        let err = storage.read("nope", &mut [0u8; 1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let mut storage = MemStorage::new();
        assert!(storage.remove("nope").is_ok());
    }

    #[test]
    fn test_clones_share_contents() {
        let handle = MemStorage::removable();
        let mut storage = handle.clone();
        storage.write("x.bin", &[7]).unwrap();
        assert_eq!(handle.file("x.bin"), Some(vec![7]));

        handle.set_present(false);
        assert!(!storage.is_present());
    }

    #[test]
    fn test_fixed_media_ignores_presence() {
        let storage = MemStorage::new();
        storage.set_present(false);
        assert!(storage.is_present());
    }
}
