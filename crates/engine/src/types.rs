use chem::ChemError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fingerprint kind used by similarity queries that do not name one.
pub const DEFAULT_FINGERPRINT: &str = "morgan_ecfp";

/// Fingerprint kind substructure screening runs against by default.
pub const SCREENING_FINGERPRINT: &str = "pattern";

/// Collection bucket for records whose source collection is unknown.
pub const UNKNOWN_COLLECTION: &str = "unknown";

/// A record as delivered by the (out-of-process) ingestion layer: not yet
/// parsed, not yet fingerprinted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawCompoundRecord {
    /// Stable identifier, typically a URI.
    pub id: String,
    /// Canonical line-notation structure string.
    pub structure: String,
    /// Source-collection name; defaults to [`UNKNOWN_COLLECTION`].
    #[serde(default)]
    pub collection: Option<String>,
}

impl RawCompoundRecord {
    pub fn new(id: impl Into<String>, structure: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            structure: structure.into(),
            collection: None,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }
}

/// A compiled record inside a dataset. Identifier and structure are
/// immutable once created; the fingerprint lives in the dataset's parallel
/// array, keyed by position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompoundRecord {
    pub id: String,
    pub structure: String,
    pub collection: String,
}

impl From<&RawCompoundRecord> for CompoundRecord {
    fn from(raw: &RawCompoundRecord) -> Self {
        let collection = match raw.collection.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => UNKNOWN_COLLECTION.to_string(),
        };
        Self {
            id: raw.id.clone(),
            structure: raw.structure.clone(),
            collection,
        }
    }
}

/// A similarity query.
///
/// Serde-friendly so a request layer can deserialize it directly; every field
/// except the query structure has a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityRequest {
    /// Query structure string.
    pub structure: String,
    /// Maximum number of hits to return; `0` means unlimited.
    #[serde(default = "SimilarityRequest::default_limit")]
    pub limit: usize,
    /// Restrict candidates to these source collections; empty means all.
    #[serde(default)]
    pub collections: Vec<String>,
    /// Fingerprint kind to rank with.
    #[serde(default = "default_fingerprint")]
    pub fingerprint: String,
    /// Apply the kind's stereo overlay to the query fingerprint.
    #[serde(default)]
    pub chirality: bool,
    /// Keep only hits scoring at least this much (inclusive).
    #[serde(default)]
    pub min_score: f64,
}

impl SimilarityRequest {
    pub(crate) fn default_limit() -> usize {
        5
    }

    pub fn new(structure: impl Into<String>) -> Self {
        Self {
            structure: structure.into(),
            limit: Self::default_limit(),
            collections: Vec::new(),
            fingerprint: DEFAULT_FINGERPRINT.to_string(),
            chirality: false,
            min_score: 0.0,
        }
    }
}

fn default_fingerprint() -> String {
    DEFAULT_FINGERPRINT.to_string()
}

/// A substructure query. Screening always runs against the engine's
/// configured screening kind; `chirality` is honored at verification only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubstructureRequest {
    /// Query pattern structure string.
    pub pattern: String,
    /// Maximum number of hits to return; `0` means unlimited.
    #[serde(default = "SubstructureRequest::default_limit")]
    pub limit: usize,
    /// Restrict candidates to these source collections; empty means all.
    #[serde(default)]
    pub collections: Vec<String>,
    /// Distinguish stereochemical variants during verification.
    #[serde(default)]
    pub chirality: bool,
    /// Require at least this many matches per compound (floored at 1).
    #[serde(default = "SubstructureRequest::default_min_match_count")]
    pub min_match_count: usize,
}

impl SubstructureRequest {
    pub(crate) fn default_limit() -> usize {
        5
    }

    pub(crate) fn default_min_match_count() -> usize {
        1
    }

    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            limit: Self::default_limit(),
            collections: Vec::new(),
            chirality: false,
            min_match_count: Self::default_min_match_count(),
        }
    }
}

/// One similarity hit: the compiled record and its score in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityHit {
    pub record: CompoundRecord,
    pub score: f64,
}

/// One substructure hit with its exact match count (always ≥ 1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubstructureHit {
    pub id: String,
    pub structure: String,
    pub collection: String,
    pub match_count: usize,
}

/// Per-kind outcome of a [`load`](crate::SearchEngine::load).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetSummary {
    pub fingerprint: String,
    /// Records compiled into the dataset.
    pub records: usize,
    /// Records dropped because their structure did not parse.
    pub skipped: usize,
}

/// Outcome of a whole reload: one summary per compiled kind, plus the kinds
/// whose compilation failed entirely and were omitted from the new mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadSummary {
    pub compiled: Vec<DatasetSummary>,
    pub failed: Vec<String>,
}

/// Engine-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Fingerprint kind substructure screening runs against. Must be a
    /// registered, chirality-independent kind for the no-false-negative
    /// screening property to hold.
    #[serde(default = "default_screening_fingerprint")]
    pub screening_fingerprint: String,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if registry::find(&self.screening_fingerprint).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "screening fingerprint `{}` is not a registered kind",
                self.screening_fingerprint
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screening_fingerprint: default_screening_fingerprint(),
        }
    }
}

fn default_screening_fingerprint() -> String {
    SCREENING_FINGERPRINT.to_string()
}

/// Errors surfaced by the search engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested fingerprint kind has no loaded dataset.
    #[error("no dataset loaded for fingerprint type `{0}`")]
    UnknownFingerprint(String),
    /// Engine configuration is inconsistent with the registry.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
    /// Toolkit infrastructure failure; never raised for malformed query
    /// input, which resolves to an empty result set instead.
    #[error("toolkit error: {0}")]
    Toolkit(#[from] ChemError),
}
