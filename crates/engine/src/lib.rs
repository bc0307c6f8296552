//! Indexed similarity and substructure search over compiled fingerprint
//! datasets.
//!
//! The engine owns one compiled [`Dataset`] per registered fingerprint kind,
//! all built from the same raw record list in a single ingestion pass. Reads
//! (`similarity_search`, `substructure_search`) are pure functions of the
//! current dataset snapshot and run concurrently without coordination;
//! [`SearchEngine::load`] is the only writer and replaces the whole
//! kind-to-dataset mapping atomically, so in-flight queries always observe a
//! complete mapping (entirely old or entirely new, never a mix).
//!
//! Similarity queries are ranked by one bulk Tanimoto pass over the candidate
//! fingerprints. Substructure queries run the classic two-phase pipeline: a
//! cheap no-false-negative bit-containment screen against a designated
//! screening fingerprint, then exact match verification on the survivors
//! only, stopping as soon as the requested number of hits is found.

mod dataset;
mod engine;
mod types;

pub use dataset::{compile, Dataset};
pub use engine::SearchEngine;
pub use types::{
    CompoundRecord, DatasetSummary, EngineConfig, EngineError, LoadSummary, RawCompoundRecord,
    SimilarityHit, SimilarityRequest, SubstructureHit, SubstructureRequest, DEFAULT_FINGERPRINT,
    SCREENING_FINGERPRINT, UNKNOWN_COLLECTION,
};
