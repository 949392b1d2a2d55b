pub mod entry;
pub mod seen;

pub use entry::SeenEntry;
pub use seen::{CacheError, SeenCache};
