pub mod freelist;
pub mod hashindex;
pub mod manager;
pub mod page;
pub mod replacer;
pub mod stats;

pub use manager::{AccessMode, BufferManager};
pub use page::{FrameId, PageId, FRAME_SIZE};
pub use replacer::PolicyKind;
pub use stats::Stats;
