use super::consts::{FILE_HI, FILE_LO};

pub const BANK_CAPACITY: usize = 256 * 1024;
pub const BANK_MASK: usize = BANK_CAPACITY - 1;
pub const TOTAL_CAPACITY: usize = 2 * BANK_CAPACITY;

/// Value of an erased EPROM cell
pub const ERASED_BYTE: u8 = 0xFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bank {
    Lo,
    Hi,
}

impl Bank {
    pub const ALL: [Bank; 2] = [Bank::Lo, Bank::Hi];

    /// File the bank is persisted to
    pub fn file_name(self) -> &'static str {
        match self {
            Bank::Lo => FILE_LO,
            Bank::Hi => FILE_HI,
        }
    }
}

/// Two fixed-size banks forming one logical image of `TOTAL_CAPACITY` bytes
pub struct RomImage {
    lo: Box<[u8]>,
    hi: Box<[u8]>,
}

impl Default for RomImage {
    fn default() -> Self {
        Self::new()
    }
}

impl RomImage {
    pub fn new() -> Self {
        Self {
            lo: vec![ERASED_BYTE; BANK_CAPACITY].into_boxed_slice(),
            hi: vec![ERASED_BYTE; BANK_CAPACITY].into_boxed_slice(),
        }
    }

    /// Byte at a logical offset. Offsets past the low bank wrap inside the high bank.
    #[inline(always)]
    pub fn byte_at(&self, offset: usize) -> u8 {
        if offset < BANK_CAPACITY {
            self.lo[offset]
        } else {
            self.hi[offset & BANK_MASK]
        }
    }

    pub fn bank(&self, bank: Bank) -> &[u8] {
        match bank {
            Bank::Lo => &self.lo,
            Bank::Hi => &self.hi,
        }
    }

    pub fn bank_mut(&mut self, bank: Bank) -> &mut [u8] {
        match bank {
            Bank::Lo => &mut self.lo,
            Bank::Hi => &mut self.hi,
        }
    }

    pub fn erase(&mut self, bank: Bank) {
        self.bank_mut(bank).fill(ERASED_BYTE);
    }

    /// Overwrite a whole bank: erased fill first, then `bytes` from offset 0.
    ///
    /// Anything past `BANK_CAPACITY` is dropped. Returns the number of bytes copied.
    pub fn replace(&mut self, bank: Bank, bytes: &[u8]) -> usize {
        let len = bytes.len().min(BANK_CAPACITY);
        let dest = self.bank_mut(bank);
        dest.fill(ERASED_BYTE);
        dest[..len].copy_from_slice(&bytes[..len]);
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_is_erased() {
        let image = RomImage::new();
        assert!(image.bank(Bank::Lo).iter().all(|&b| b == ERASED_BYTE));
        assert!(image.bank(Bank::Hi).iter().all(|&b| b == ERASED_BYTE));
        assert_eq!(image.byte_at(0), ERASED_BYTE);
        assert_eq!(image.byte_at(TOTAL_CAPACITY - 1), ERASED_BYTE);
    }

    #[test]
    fn test_byte_at_selects_bank() {
        let mut image = RomImage::new();
        image.replace(Bank::Lo, &[0x11, 0x22]);
        image.replace(Bank::Hi, &[0x33, 0x44]);

        assert_eq!(image.byte_at(0), 0x11);
        assert_eq!(image.byte_at(1), 0x22);
        assert_eq!(image.byte_at(BANK_CAPACITY), 0x33);
        assert_eq!(image.byte_at(BANK_CAPACITY + 1), 0x44);
    }

    #[test]
    fn test_hi_bank_wraps_within_its_capacity() {
        let mut image = RomImage::new();
        image.replace(Bank::Hi, &[0x5A]);
        assert_eq!(image.byte_at(TOTAL_CAPACITY), 0x5A);
        assert_eq!(image.byte_at(3 * BANK_CAPACITY), 0x5A);
    }

    #[test]
    fn test_short_replace_leaves_erased_filler() {
        let mut image = RomImage::new();
        image.replace(Bank::Lo, &[0u8; 64]);
        let copied = image.replace(Bank::Lo, &[0xAB; 4]);

        assert_eq!(copied, 4);
        assert_eq!(&image.bank(Bank::Lo)[..4], &[0xAB; 4]);
        // stale zeros from the first load are gone
        assert!(image.bank(Bank::Lo)[4..].iter().all(|&b| b == ERASED_BYTE));
    }

    #[test]
    fn test_oversized_replace_is_truncated() {
        let mut image = RomImage::new();
        let bytes = vec![0x01; BANK_CAPACITY + 16];
        assert_eq!(image.replace(Bank::Hi, &bytes), BANK_CAPACITY);
        // low bank untouched
        assert_eq!(image.byte_at(0), ERASED_BYTE);
    }

    #[test]
    fn test_erase_resets_one_bank() {
        let mut image = RomImage::new();
        image.replace(Bank::Lo, &[0x00; 8]);
        image.replace(Bank::Hi, &[0x00; 8]);
        image.erase(Bank::Hi);
        assert_eq!(image.byte_at(0), 0x00);
        assert_eq!(image.byte_at(BANK_CAPACITY), ERASED_BYTE);
    }
}
