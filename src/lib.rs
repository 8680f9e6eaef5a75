pub mod error;

pub mod buffer;
pub mod config;
pub mod storage;
pub mod trace;
