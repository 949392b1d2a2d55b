pub mod identifiers;
pub mod score;

pub use identifiers::PostingId;
pub use score::{ScoreResult, FEW_KEYWORDS, NO_WEAKNESS};
