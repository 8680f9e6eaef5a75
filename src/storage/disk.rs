use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::{check_bounds, check_len, PageStore};
use crate::buffer::page::{PageId, FRAME_SIZE};
use crate::error::{Error, Result};

/// FileStore keeps pages in one flat file, page `n` lives at byte offset
/// `n * FRAME_SIZE`. There is no header and no checksum.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: File,
    num_pages: u32,
    /// use bit per page, only kept in memory.
    in_use: Vec<bool>,
}

impl FileStore {
    /// Open the file at `path`, creating it when missing. The page count is
    /// derived from the file length, a trailing partial page is ignored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FileStore> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).create(true).open(&path)?;
        let len = file.metadata()?.len();
        let num_pages = u32::try_from(len / FRAME_SIZE as u64)
            .map_err(|e| Error::Internal(format!("{}: {}", path.display(), e)))?;
        debug!("opened page file {} with {} pages", path.display(), num_pages);
        Ok(FileStore { path, file, num_pages, in_use: vec![true; num_pages as usize] })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync and release the file handle.
    pub fn close(mut self) -> Result<()> {
        self.sync()
    }

    fn seek(&mut self, page_id: PageId) -> Result<()> {
        let offset = page_id as u64 * FRAME_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl PageStore for FileStore {
    fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        check_len(buf.len())?;
        check_bounds(page_id, self.num_pages)?;
        self.seek(page_id)?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, buf: &[u8]) -> Result<()> {
        check_len(buf.len())?;
        check_bounds(page_id, self.num_pages)?;
        self.seek(page_id)?;
        self.file.write_all(buf)?;
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = self.num_pages;
        let num_pages = page_id.checked_add(1).ok_or_else(|| {
            Error::Internal(format!("{}: page ids exhausted", self.path.display()))
        })?;
        self.file.seek(SeekFrom::Start(page_id as u64 * FRAME_SIZE as u64))?;
        self.file.write_all(&[0u8; FRAME_SIZE])?;
        self.num_pages = num_pages;
        self.in_use.push(true);
        Ok(page_id)
    }

    fn num_pages(&self) -> u32 {
        self.num_pages
    }

    fn set_use(&mut self, page_id: PageId, in_use: bool) -> Result<()> {
        check_bounds(page_id, self.num_pages)?;
        self.in_use[page_id as usize] = in_use;
        Ok(())
    }

    fn get_use(&self, page_id: PageId) -> Result<bool> {
        check_bounds(page_id, self.num_pages)?;
        Ok(self.in_use[page_id as usize])
    }

    fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}
