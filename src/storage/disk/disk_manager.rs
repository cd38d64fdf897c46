use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use parking_lot::Mutex;

use crate::common::types::{BlockNumber, Page, PAGE_SIZE};
use super::{BlockSource, StorageError};

/// Blocks per segment file (1GB of 8KB pages)
pub const RELSEG_SIZE: BlockNumber = 131072;

/// DiskManager reads pages of one relation from its data files.
///
/// A relation larger than one segment continues in `<path>.1`, `<path>.2`, and so on.
/// Files are opened read-only; this type never writes.
pub struct DiskManager {
    base_path: PathBuf,
    segments: Mutex<Vec<File>>,
}

impl DiskManager {
    /// Open the first segment of a relation
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = path.as_ref().to_path_buf();
        let first = OpenOptions::new()
            .read(true)
            .open(&base_path)
            .map_err(StorageError::IoError)?;

        log::debug!("opened relation file {}", base_path.display());

        Ok(Self {
            base_path,
            segments: Mutex::new(vec![first]),
        })
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Path of segment `segno`; segment 0 has no suffix
    pub fn segment_path(&self, segno: usize) -> PathBuf {
        if segno == 0 {
            self.base_path.clone()
        } else {
            let mut name = self.base_path.as_os_str().to_os_string();
            name.push(format!(".{}", segno));
            PathBuf::from(name)
        }
    }

    /// Segment files currently present on disk, with their block counts
    pub fn segment_files(&self) -> Result<Vec<(PathBuf, BlockNumber)>, StorageError> {
        let mut segments = self.segments.lock();
        let mut files = Vec::new();
        let mut segno = 0;
        while let Some(file) = self.segment(&mut segments, segno)? {
            let blocks = Self::blocks_in(file)?;
            files.push((self.segment_path(segno), blocks));
            if blocks < RELSEG_SIZE {
                break;
            }
            segno += 1;
        }
        Ok(files)
    }

    // Open segment `segno` if it exists, caching the handle
    fn segment<'a>(&self, segments: &'a mut Vec<File>, segno: usize) -> Result<Option<&'a mut File>, StorageError> {
        while segments.len() <= segno {
            let path = self.segment_path(segments.len());
            match OpenOptions::new().read(true).open(&path) {
                Ok(file) => segments.push(file),
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(StorageError::IoError(e)),
            }
        }
        Ok(segments.get_mut(segno))
    }

    fn blocks_in(file: &File) -> Result<BlockNumber, StorageError> {
        let len = file.metadata().map_err(StorageError::IoError)?.len();
        // A trailing partial page is not a block
        Ok((len / PAGE_SIZE as u64) as BlockNumber)
    }
}

impl BlockSource for DiskManager {
    fn block_count(&self) -> Result<BlockNumber, StorageError> {
        let mut total: u64 = 0;
        for (_, blocks) in self.segment_files()? {
            total += blocks as u64;
        }
        BlockNumber::try_from(total).map_err(|_| StorageError::TooManyBlocks)
    }

    fn read_block(&self, block: BlockNumber, page: &mut Page) -> Result<(), StorageError> {
        let segno = (block / RELSEG_SIZE) as usize;
        let offset = (block % RELSEG_SIZE) as u64 * PAGE_SIZE as u64;

        let mut segments = self.segments.lock();
        let file = match self.segment(&mut segments, segno)? {
            Some(file) => file,
            None => {
                drop(segments);
                return Err(StorageError::BlockOutOfRange { block, block_count: self.block_count()? });
            }
        };

        file.seek(SeekFrom::Start(offset)).map_err(StorageError::IoError)?;

        let mut buffer = [0u8; PAGE_SIZE];
        let mut read = 0;
        while read < PAGE_SIZE {
            match file.read(&mut buffer[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(StorageError::IoError(e)),
            }
        }

        if read == 0 {
            drop(segments);
            return Err(StorageError::BlockOutOfRange { block, block_count: self.block_count()? });
        }
        if read < PAGE_SIZE {
            return Err(StorageError::ShortRead { block, read });
        }

        page.data.copy_from_slice(&buffer);
        page.block = block;

        Ok(())
    }
}
