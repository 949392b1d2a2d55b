pub mod posting;

pub use crate::types::identifiers::PostingId;
pub use posting::Posting;
