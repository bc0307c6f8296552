//! Umbrella crate for the molsearch stack.
//!
//! Stitches the fingerprint registry, the chemistry toolkit boundary, and
//! the search engine together so callers get the whole API from a single
//! dependency: compile raw compound records into per-kind datasets, then run
//! similarity and substructure queries against them.
//!
//! ```
//! use molsearch::{NGramToolkit, RawCompoundRecord, SearchEngine, SimilarityRequest};
//!
//! let engine = SearchEngine::with_defaults(NGramToolkit::default());
//! engine.load(&[
//!     RawCompoundRecord::new("mol:benzene", "c1ccccc1").with_collection("chebi"),
//!     RawCompoundRecord::new("mol:ethanol", "CCO").with_collection("chebi"),
//! ]);
//!
//! let hits = engine
//!     .similarity_search(&SimilarityRequest::new("c1ccccc1"))
//!     .unwrap();
//! assert_eq!(hits[0].record.id, "mol:benzene");
//! assert_eq!(hits[0].score, 1.0);
//! ```
//!
//! The engine is generic over the [`Toolkit`] capability; deployments bind a
//! native cheminformatics library, while [`NGramToolkit`] keeps the whole
//! stack runnable without one.

mod config;

pub use chem::{ChemError, LineMolecule, NGramConfig, NGramFingerprint, NGramToolkit, Toolkit};
pub use config::{ConfigLoadError, EngineYamlConfig, MolsearchConfig, ToolkitYamlConfig};
pub use engine::{
    compile, CompoundRecord, Dataset, DatasetSummary, EngineConfig, EngineError, LoadSummary,
    RawCompoundRecord, SearchEngine, SimilarityHit, SimilarityRequest, SubstructureHit,
    SubstructureRequest, DEFAULT_FINGERPRINT, SCREENING_FINGERPRINT, UNKNOWN_COLLECTION,
};
pub use registry::{
    Confidence, Explainability, FingerprintFamily, FingerprintKind, FingerprintSummary, OptionMap,
};

/// Build a [`SearchEngine`] over the built-in toolkit from a loaded
/// configuration file.
pub fn engine_from_config(
    config: &MolsearchConfig,
) -> Result<SearchEngine<NGramToolkit>, EngineError> {
    let toolkit = NGramToolkit::new(config.toolkit.to_ngram_config());
    SearchEngine::new(toolkit, config.engine.to_engine_config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_from_default_config_is_ready_to_load() {
        let engine = engine_from_config(&MolsearchConfig::default()).unwrap();
        assert_eq!(engine.config().screening_fingerprint, SCREENING_FINGERPRINT);

        let summary = engine.load(&[RawCompoundRecord::new("mol:ethanol", "CCO")]);
        assert!(summary.failed.is_empty());
        assert_eq!(summary.compiled.len(), registry::all().len());
    }

    #[test]
    fn engine_from_config_respects_toolkit_settings() {
        let config = MolsearchConfig {
            toolkit: ToolkitYamlConfig {
                seed: Some(7),
                parallel: true,
            },
            ..MolsearchConfig::default()
        };
        let engine = engine_from_config(&config).unwrap();
        assert_eq!(engine.toolkit().config().seed, 7);
        assert!(engine.toolkit().config().parallel);
    }
}
