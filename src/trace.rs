//! Workload traces: one request per line, `<op>,<page_id>` with op `0` for a
//! read and `1` for a write.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use crate::buffer::{AccessMode, BufferManager, PageId, Stats};
use crate::error::{Error, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Request {
    pub mode: AccessMode,
    pub page_id: PageId,
}

pub fn parse<R: BufRead>(reader: R) -> Result<Vec<Request>> {
    let mut requests = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || Error::Internal(format!("malformed trace line {}: {}", i + 1, line));
        let (op, page_id) = line.split_once(',').ok_or_else(malformed)?;
        let mode = match op.trim() {
            "0" => AccessMode::Read,
            "1" => AccessMode::Write,
            _ => return Err(malformed()),
        };
        let page_id = page_id.trim().parse::<PageId>().map_err(|_| malformed())?;
        requests.push(Request { mode, page_id });
    }
    Ok(requests)
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Request>> {
    let file = File::open(path)?;
    parse(BufReader::new(file))
}

/// Create pages until the store holds every page up to `max_page_id`, then
/// flush and reset the statistics. Return the number of pages created.
pub fn prepare(bm: &mut BufferManager, max_page_id: PageId) -> Result<u32> {
    // the page count is a PageId too, the last id can never be allocated.
    if max_page_id == PageId::MAX {
        return Err(Error::Internal(format!("page id {} is out of range", max_page_id)));
    }
    let mut created = 0;
    while bm.store().num_pages() <= max_page_id {
        let (page_id, _) = bm.fix_new()?;
        bm.unfix(page_id)?;
        created += 1;
    }
    bm.flush_all()?;
    bm.reset_stats();
    if created > 0 {
        info!("created {} pages, store holds {} pages", created, bm.store().num_pages());
    }
    Ok(created)
}

/// Fix and immediately unfix every request in order.
pub fn replay(bm: &mut BufferManager, requests: &[Request]) -> Result<Stats> {
    for req in requests {
        bm.fix(req.page_id, req.mode)?;
        bm.unfix(req.page_id)?;
    }
    Ok(bm.stats())
}
