use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Domain → lab label table used to name the organization behind a source.
///
/// A domain matches a host equal to it or any subdomain of it. When several
/// domains match, the longest one wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabDirectory {
    labels: BTreeMap<String, String>,
}

impl LabDirectory {
    pub fn new() -> Self {
        LabDirectory {
            labels: BTreeMap::new(),
        }
    }

    /// The labs monitored out of the box.
    pub fn known_labs() -> Self {
        let mut dir = Self::new();
        dir.insert("laas.fr", "LAAS-CNRS");
        dir.insert("ims-bordeaux.fr", "IMS Bordeaux");
        dir.insert("gipsa-lab.grenoble-inp.fr", "GIPSA-Lab");
        dir.insert("timc.fr", "TIMC");
        dir.insert("ampere-lab.fr", "Ampère");
        dir.insert("labri.fr", "LaBRI");
        dir
    }

    pub fn insert(&mut self, domain: impl Into<String>, label: impl Into<String>) {
        let domain = domain.into().trim().trim_start_matches('.').to_lowercase();
        self.labels.insert(domain, label.into());
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label_for_host(&self, host: &str) -> Option<&str> {
        let host = host.to_lowercase();
        self.labels
            .iter()
            .filter(|(domain, _)| {
                host == **domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|rest| rest.ends_with('.'))
            })
            .max_by_key(|(domain, _)| domain.len())
            .map(|(_, label)| label.as_str())
    }

    /// Best-effort lab name for a source page. Falls back to the bare host
    /// (with port, if explicit); empty when the URL has no host.
    pub fn label_for_url(&self, source_url: &str) -> String {
        let Ok(url) = Url::parse(source_url.trim()) else {
            return String::new();
        };
        let Some(host) = url.host_str() else {
            return String::new();
        };

        if let Some(label) = self.label_for_host(host) {
            return label.to_string();
        }

        match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}
