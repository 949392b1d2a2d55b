pub mod profile;
pub mod ranking;
pub mod tiers;

pub use profile::{CandidateProfile, DomainsOfInterest, LocationPreferences, ProfileError};
pub use ranking::{ProfileScorer, Scorer};
pub use tiers::MatchTier;
