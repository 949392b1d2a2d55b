//! Bodies of the named operations exposed to the calling agent.
//!
//! The transport is not defined here. A caller hands over a tool name and a
//! JSON argument bag and gets back text plus an error flag; nothing below
//! panics or leaks an error past [`Toolbox::call`].

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, Settings};
use crate::matching::{CandidateProfile, ProfileError, ProfileScorer, Scorer};
use crate::posting::Posting;
use crate::tracking::{CreatedEntry, SinkError, TrackingEntry, TrackingSink};
use crate::types::score::ScoreResult;

pub const READ_PROFILE: &str = "lire_profil";
pub const READ_SOURCES: &str = "lire_sites_surveilles";
pub const SCORE_POSTING: &str = "analyser_offre";
pub const CREATE_TRACKING_ENTRY: &str = "creer_candidature_notion";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Invalid argument {name}: {source}")]
    InvalidArgument {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
    #[error("Tracking sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Text result of one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn error(text: String) -> Self {
        Self {
            text,
            is_error: true,
        }
    }
}

/// Name, description and JSON input schema of one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Configuration documents as loaded by the embedding process. Each is
/// validated only by the operations that need it.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    pub profile: Value,
    pub sources: Value,
    pub settings: Value,
}

/// Every operation this crate implements, for the transport to advertise.
pub fn list_tools() -> Vec<ToolSpec> {
    let no_args = json!({ "type": "object", "properties": {}, "required": [] });
    vec![
        ToolSpec {
            name: READ_PROFILE,
            description: "Reads the candidate profile, reduced to the fields used for matching",
            input_schema: no_args.clone(),
        },
        ToolSpec {
            name: READ_SOURCES,
            description: "Reads the list of monitored sources for PhD offers",
            input_schema: no_args,
        },
        ToolSpec {
            name: SCORE_POSTING,
            description: "Scores a PhD offer against the candidate profile",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "offre": { "type": "object", "description": "The offer (titre, description, labo, url, lieu, ...)" },
                    "profil": { "type": "object", "description": "Candidate profile; the configured one is used when absent" }
                },
                "required": ["offre"]
            }),
        },
        ToolSpec {
            name: CREATE_TRACKING_ENTRY,
            description: "Creates a tracking entry for a scored PhD offer",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "offre": { "type": "object", "description": "The offer (titre, labo, url, lieu, ...)" },
                    "analyse": { "type": "object", "description": "Score result (score, justification, points_forts, points_faibles)" }
                },
                "required": ["offre", "analyse"]
            }),
        },
    ]
}

pub struct Toolbox<K> {
    config: ToolConfig,
    sink: K,
}

impl<K> Toolbox<K>
where
    K: TrackingSink,
{
    pub fn new(config: ToolConfig, sink: K) -> Self {
        Self { config, sink }
    }

    pub async fn call(&self, name: &str, arguments: &Value) -> ToolOutput {
        match self.dispatch(name, arguments).await {
            Ok(text) => ToolOutput::ok(text),
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                ToolOutput::error(format!("Erreur: {e}"))
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: &Value) -> Result<String, ToolError> {
        match name {
            READ_PROFILE => self.read_profile(),
            READ_SOURCES => self.read_sources(),
            SCORE_POSTING => {
                let result = self.score_posting(arguments)?;
                Ok(serde_json::to_string_pretty(&result)?)
            }
            CREATE_TRACKING_ENTRY => {
                let created = self.create_tracking_entry(arguments).await?;
                Ok(format!(
                    "Entrée créée avec succès\n\nURL: {}",
                    created.url
                ))
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    pub fn read_profile(&self) -> Result<String, ToolError> {
        let profile = CandidateProfile::from_value(self.config.profile.clone())?;
        let json = serde_json::to_string_pretty(&profile.to_minimal())?;
        Ok(format!(
            "# PROFIL CANDIDAT\n\n\
             Profil réduit aux critères de matching. Il peut être réutilisé tel quel \
             pour tous les appels à '{SCORE_POSTING}'.\n\n{json}"
        ))
    }

    pub fn read_sources(&self) -> Result<String, ToolError> {
        Ok(serde_json::to_string_pretty(&self.config.sources)?)
    }

    pub fn score_posting(&self, arguments: &Value) -> Result<ScoreResult, ToolError> {
        let posting: Posting = argument(arguments, "offre")?;
        let explicit = arguments
            .get("profil")
            .filter(|v| !v.is_null() && v.as_object().map_or(true, |map| !map.is_empty()));
        let profile = match explicit {
            Some(value) => CandidateProfile::from_value(value.clone())?,
            None => CandidateProfile::from_value(self.config.profile.clone())?,
        };
        let settings = Settings::from_value(self.config.settings.clone())?;

        let scorer = ProfileScorer::new(settings.matching);
        Ok(scorer.score(&posting, &profile))
    }

    pub async fn create_tracking_entry(&self, arguments: &Value) -> Result<CreatedEntry, ToolError> {
        let posting: Posting = argument(arguments, "offre")?;
        let result: ScoreResult = argument(arguments, "analyse")?;
        let settings = Settings::from_value(self.config.settings.clone())?;

        let entry = TrackingEntry::build(&posting, &result, settings.tracking()?);
        let created = self.sink.create_entry(&entry).await?;

        info!(id = %created.id, url = %created.url, "tracking entry created");
        Ok(created)
    }
}

fn argument<T>(arguments: &Value, name: &'static str) -> Result<T, ToolError>
where
    T: serde::de::DeserializeOwned,
{
    let value = arguments
        .get(name)
        .filter(|v| !v.is_null())
        .ok_or(ToolError::MissingArgument(name))?;
    serde_json::from_value(value.clone()).map_err(|source| ToolError::InvalidArgument { name, source })
}
