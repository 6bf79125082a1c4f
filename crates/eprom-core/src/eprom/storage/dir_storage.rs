use super::Storage;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Medium backed by a host directory.
///
/// A removable directory counts as inserted while it exists. A fixed one is
/// created on first write.
pub struct DirStorage {
    root: PathBuf,
    removable: bool,
}

impl DirStorage {
    pub fn removable(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            removable: true,
        }
    }

    pub fn fixed(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            removable: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for DirStorage {
    fn is_present(&self) -> bool {
        !self.removable || self.root.is_dir()
    }

    fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    fn read(&mut self, name: &str, buf: &mut [u8]) -> io::Result<usize> {
        let mut file = File::open(self.path(name))?;
        let mut total = 0;
        while total < buf.len() {
            let n = file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        if !self.removable {
            fs::create_dir_all(&self.root)?;
        }
        fs::write(self.path(name), data)
    }

    fn remove(&mut self, name: &str) -> io::Result<()> {
        match fs::remove_file(self.path(name)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "eprom-core-{}-{}-{}",
            tag,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn test_fixed_dir_is_created_on_write() {
        let dir = scratch_dir("fixed");
        let mut storage = DirStorage::fixed(&dir);
        assert_eq!(storage.root(), dir.as_path());
        assert!(storage.is_present());
        assert!(!storage.exists("romLo.bin"));

        storage.write("romLo.bin", &[1, 2, 3, 4]).unwrap();
        assert!(storage.exists("romLo.bin"));
        assert!(storage.root().join("romLo.bin").is_file());

        let mut buf = [0u8; 2];
        assert_eq!(storage.read("romLo.bin", &mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);

        storage.remove("romLo.bin").unwrap();
        storage.remove("romLo.bin").unwrap();
        assert!(!storage.exists("romLo.bin"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_removable_dir_presence_follows_directory() {
        let dir = scratch_dir("removable");
        let storage = DirStorage::removable(&dir);
        assert!(!storage.is_present());

        fs::create_dir_all(&dir).unwrap();
        assert!(storage.is_present());

        fs::remove_dir_all(&dir).unwrap();
        assert!(!storage.is_present());
    }

    #[test]
    fn test_write_to_ejected_removable_fails() {
        let dir = scratch_dir("ejected");
        let mut storage = DirStorage::removable(&dir);
        assert!(storage.write("romHi.bin", &[0]).is_err());
    }
}
