use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Separates the fingerprinted fields so that ("a_b", "c") and ("a", "b_c")
/// never hash to the same identity.
const FIELD_SEPARATOR: &[u8] = b"\x1f";

/// Content fingerprint of a posting.
///
/// Derived from (title, lab, url) in that fixed order. Description, location
/// and dates do not participate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(String);

impl PostingId {
    pub fn from_fields(title: &str, lab: &str, url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(lab.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(url.as_bytes());

        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        PostingId(format!("sha256:{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
