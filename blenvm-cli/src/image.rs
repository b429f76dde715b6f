//! NOR flash emulated by a file on the host.
//!
//! The image behaves like erased-to-ones NOR: programming only clears bits
//! and a whole sector is the smallest unit that can be set back to `0xFF`.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use embedded_storage::nor_flash::{
    check_erase, check_read, check_write, ErrorType, MultiwriteNorFlash, NorFlash,
    NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

/// Sector size of image files.
pub const SECTOR_SIZE: usize = 4096;

/// Error of a [`FileFlash`] operation.
#[derive(Debug)]
pub enum FileFlashError {
    /// Out of bounds or misaligned access.
    Flash(NorFlashErrorKind),
    /// The host file could not be accessed.
    Io(io::Error),
}

impl NorFlashError for FileFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            Self::Flash(kind) => *kind,
            Self::Io(_) => NorFlashErrorKind::Other,
        }
    }
}

impl From<NorFlashErrorKind> for FileFlashError {
    fn from(kind: NorFlashErrorKind) -> Self {
        Self::Flash(kind)
    }
}

impl From<io::Error> for FileFlashError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// A flash image file.
#[derive(Debug)]
pub struct FileFlash {
    file: File,
    capacity: usize,
}

impl FileFlash {
    /// Create (or overwrite) an erased image of `sectors` sectors.
    pub fn create(path: &Path, sectors: u32) -> Result<Self> {
        if sectors == 0 {
            bail!("an image needs at least one sector");
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        let erased = [0xFFu8; SECTOR_SIZE];
        for _ in 0..sectors {
            file.write_all(&erased)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        file.flush()?;

        log::info!("created {} ({} sectors)", path.display(), sectors);

        Ok(Self {
            file,
            capacity: sectors as usize * SECTOR_SIZE,
        })
    }

    /// Open an existing image.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let len = file.metadata()?.len();
        if len == 0 || len % SECTOR_SIZE as u64 != 0 {
            bail!(
                "{} is {} bytes, not a whole number of {} byte sectors",
                path.display(),
                len,
                SECTOR_SIZE
            );
        }
        let capacity = usize::try_from(len).context("image too large")?;
        if u32::try_from(capacity).is_err() {
            bail!("{} exceeds the 4 GiB flash address space", path.display());
        }

        log::debug!("opened {} ({} bytes)", path.display(), capacity);

        Ok(Self { file, capacity })
    }

    /// Number of sectors in the image.
    pub fn sectors(&self) -> u32 {
        (self.capacity / SECTOR_SIZE) as u32
    }

    fn read_at(&mut self, offset: u32, bytes: &mut [u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(bytes)
    }

    fn write_at(&mut self, offset: u32, bytes: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(bytes)
    }
}

impl ErrorType for FileFlash {
    type Error = FileFlashError;
}

impl ReadNorFlash for FileFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        check_read(self, offset, bytes.len())?;
        self.read_at(offset, bytes)?;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl NorFlash for FileFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = SECTOR_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        check_erase(self, from, to)?;
        let erased = [0xFFu8; SECTOR_SIZE];
        for sector in (from..to).step_by(SECTOR_SIZE) {
            self.write_at(sector, &erased)?;
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        check_write(self, offset, bytes.len())?;

        let mut current = vec![0u8; bytes.len()];
        self.read_at(offset, &mut current)?;
        for (cell, byte) in current.iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        self.write_at(offset, &current)?;
        Ok(())
    }
}

impl MultiwriteNorFlash for FileFlash {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_erased() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nvm.bin");
        let mut flash = FileFlash::create(&path, 2).unwrap();

        assert_eq!(flash.capacity(), 2 * SECTOR_SIZE);
        assert_eq!(flash.sectors(), 2);

        let mut buf = [0u8; 16];
        flash.read(SECTOR_SIZE as u32 - 8, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 16]);
    }

    #[test]
    fn test_write_only_clears_bits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nvm.bin");
        let mut flash = FileFlash::create(&path, 1).unwrap();

        flash.write(8, &[0xF0, 0x0F, 0xAA, 0xFF]).unwrap();
        flash.write(8, &[0x3C, 0xFF, 0xFF, 0x00]).unwrap();

        let mut buf = [0u8; 4];
        flash.read(8, &mut buf).unwrap();
        assert_eq!(buf, [0x30, 0x0F, 0xAA, 0x00]);

        flash.erase(0, SECTOR_SIZE as u32).unwrap();
        flash.read(8, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 4]);
    }

    #[test]
    fn test_misaligned_access_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nvm.bin");
        let mut flash = FileFlash::create(&path, 1).unwrap();

        let err = flash.write(2, &[0; 4]).unwrap_err();
        assert_eq!(err.kind(), NorFlashErrorKind::NotAligned);

        let err = flash.erase(0, 100).unwrap_err();
        assert_eq!(err.kind(), NorFlashErrorKind::NotAligned);

        let mut buf = [0u8; 4];
        let err = flash.read(SECTOR_SIZE as u32, &mut buf).unwrap_err();
        assert_eq!(err.kind(), NorFlashErrorKind::OutOfBounds);
    }

    #[test]
    fn test_reopen_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nvm.bin");
        FileFlash::create(&path, 1).unwrap().write(0, b"blef").unwrap();

        let mut flash = FileFlash::open(&path).unwrap();
        let mut buf = [0u8; 4];
        flash.read(0, &mut buf).unwrap();
        assert_eq!(&buf, b"blef");
    }

    #[test]
    fn test_open_rejects_partial_sector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        std::fs::write(&path, [0xFFu8; 100]).unwrap();

        let err = FileFlash::open(&path).unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }
}
