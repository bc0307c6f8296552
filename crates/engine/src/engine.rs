use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chem::Toolkit;
use registry::{FingerprintKind, FingerprintSummary};

use crate::dataset::{compile, Dataset};
use crate::types::{
    DatasetSummary, EngineConfig, EngineError, LoadSummary, RawCompoundRecord, SimilarityHit,
    SimilarityRequest, SubstructureHit, SubstructureRequest,
};


type DatasetMap<F> = HashMap<String, Dataset<F>>;

/// Search engine over per-fingerprint-kind compiled datasets.
///
/// The engine is a passive, synchronous structure: searches read an immutable
/// snapshot and may run from any number of threads; [`SearchEngine::load`] is
/// the single writer and swaps the whole snapshot atomically.
pub struct SearchEngine<T: Toolkit> {
    toolkit: T,
    config: EngineConfig,
    datasets: RwLock<Arc<DatasetMap<T::Fingerprint>>>,
    // Serializes whole reloads without blocking readers mid-compile.
    reload: Mutex<()>,
}

impl<T: Toolkit> SearchEngine<T> {
    /// Create an empty engine. Fails when the config names an unregistered
    /// screening kind.
    pub fn new(toolkit: T, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            toolkit,
            config,
            datasets: RwLock::new(Arc::new(HashMap::new())),
            reload: Mutex::new(()),
        })
    }

    /// Create an empty engine with the default configuration, which is valid
    /// by construction.
    pub fn with_defaults(toolkit: T) -> Self {
        Self {
            toolkit,
            config: EngineConfig::default(),
            datasets: RwLock::new(Arc::new(HashMap::new())),
            reload: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    fn snapshot(&self) -> Arc<DatasetMap<T::Fingerprint>> {
        self.datasets
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Compile `records` once per registered fingerprint kind and replace the
    /// whole kind-to-dataset mapping atomically.
    ///
    /// A kind whose compilation fails is omitted from the new mapping
    /// (error-logged and reported in the summary) without aborting the other
    /// kinds. Concurrent loads are serialized; readers keep the old snapshot
    /// until the swap.
    pub fn load(&self, records: &[RawCompoundRecord]) -> LoadSummary {
        let _exclusive = self
            .reload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        tracing::info!(records = records.len(), "compiling datasets");
        let mut next: DatasetMap<T::Fingerprint> = HashMap::with_capacity(registry::all().len());
        let mut summary = LoadSummary::default();
        for kind in registry::all() {
            match compile(&self.toolkit, kind, records) {
                Ok(dataset) => {
                    summary.compiled.push(DatasetSummary {
                        fingerprint: kind.id.to_string(),
                        records: dataset.len(),
                        skipped: records.len() - dataset.len(),
                    });
                    next.insert(kind.id.to_string(), dataset);
                }
                Err(err) => {
                    tracing::error!(
                        kind = %kind.id,
                        error = %err,
                        "fingerprint compilation failed; kind omitted from reload"
                    );
                    summary.failed.push(kind.id.to_string());
                }
            }
        }

        let mut guard = self
            .datasets
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(next);
        summary
    }

    /// Descriptor summaries for every registered fingerprint kind, in
    /// table-definition order, independent of dataset load state.
    pub fn list_fingerprint_types(&self) -> Vec<FingerprintSummary> {
        registry::all().iter().map(FingerprintKind::summary).collect()
    }

    /// Rank dataset records by fingerprint similarity to the query structure.
    ///
    /// Returns hits sorted by score descending; equal scores keep candidate
    /// order, so results are deterministic for a fixed dataset and filter.
    /// A query that does not parse yields an empty result, not an error.
    pub fn similarity_search(
        &self,
        request: &SimilarityRequest,
    ) -> Result<Vec<SimilarityHit>, EngineError> {
        let snapshot = self.snapshot();
        let dataset = snapshot
            .get(request.fingerprint.as_str())
            .ok_or_else(|| EngineError::UnknownFingerprint(request.fingerprint.clone()))?;
        let kind = registry::find(&request.fingerprint)
            .ok_or_else(|| EngineError::UnknownFingerprint(request.fingerprint.clone()))?;

        let query = match self.toolkit.parse(&request.structure) {
            Ok(molecule) => molecule,
            Err(err) if err.is_parse() => {
                tracing::warn!(error = %err, "similarity query did not parse; no matches");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        let options = kind.query_options(request.chirality);
        let query_fingerprint = self.toolkit.fingerprint(&query, kind, &options)?;

        let positions = candidate_positions(dataset, &request.collections);
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let targets: Vec<&T::Fingerprint> = positions
            .iter()
            .map(|&position| dataset.fingerprint(position))
            .collect();
        let scores = self.toolkit.bulk_similarity(&query_fingerprint, &targets);

        let mut hits: Vec<SimilarityHit> = positions
            .iter()
            .zip(scores)
            .filter(|(_, score)| *score >= request.min_score)
            .map(|(&position, score)| SimilarityHit {
                record: dataset.record(position).clone(),
                score,
            })
            .collect();
        // Stable sort: equal scores keep their candidate order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        if request.limit > 0 {
            hits.truncate(request.limit);
        }
        Ok(hits)
    }

    /// Find records containing the query pattern as a substructure.
    ///
    /// Two phases: a cheap bit-containment screen against the configured
    /// screening kind (never chirality-aware, so no true match is screened
    /// out), then exact verification of the survivors in candidate order,
    /// stopping as soon as `limit` hits have accumulated. Result order is
    /// candidate order.
    pub fn substructure_search(
        &self,
        request: &SubstructureRequest,
    ) -> Result<Vec<SubstructureHit>, EngineError> {
        let screening_kind = self.config.screening_fingerprint.as_str();
        let snapshot = self.snapshot();
        let dataset = snapshot
            .get(screening_kind)
            .ok_or_else(|| EngineError::UnknownFingerprint(screening_kind.to_string()))?;
        let kind = registry::find(screening_kind)
            .ok_or_else(|| EngineError::UnknownFingerprint(screening_kind.to_string()))?;

        let pattern = match self.toolkit.parse(&request.pattern) {
            Ok(molecule) => molecule,
            Err(err) if err.is_parse() => {
                tracing::warn!(error = %err, "substructure query did not parse; no matches");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        // Screening fingerprints are chirality-independent by design.
        let query_fingerprint = self
            .toolkit
            .fingerprint(&pattern, kind, &kind.default_options)?;

        let positions = candidate_positions(dataset, &request.collections);
        let candidates: Vec<usize> = positions
            .into_iter()
            .filter(|&position| {
                self.toolkit
                    .screens(&query_fingerprint, dataset.fingerprint(position))
            })
            .collect();
        tracing::debug!(
            survivors = candidates.len(),
            total = dataset.len(),
            "substructure screening complete"
        );

        let min_matches = request.min_match_count.max(1);
        let mut hits = Vec::new();
        for position in candidates {
            let record = dataset.record(position);
            let target = match self.toolkit.parse(&record.structure) {
                Ok(molecule) => molecule,
                Err(err) if err.is_parse() => {
                    tracing::debug!(id = %record.id, error = %err, "candidate no longer parses; excluded");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            let count = self.toolkit.match_count(&target, &pattern, request.chirality);
            if count >= min_matches {
                hits.push(SubstructureHit {
                    id: record.id.clone(),
                    structure: record.structure.clone(),
                    collection: record.collection.clone(),
                    match_count: count,
                });
                // Verification is the expensive step; stop the moment the
                // requested number of hits is reached.
                if request.limit > 0 && hits.len() >= request.limit {
                    break;
                }
            }
        }
        Ok(hits)
    }
}

/// Candidate positions for a query: all of them in storage order when the
/// filter is empty, otherwise the union of the named collections' buckets in
/// filter order then storage order. Names absent from the dataset contribute
/// nothing.
fn candidate_positions<F>(dataset: &Dataset<F>, collections: &[String]) -> Vec<usize> {
    if collections.is_empty() {
        return (0..dataset.len()).collect();
    }
    let mut positions = Vec::new();
    for name in collections {
        if let Some(bucket) = dataset.positions(name) {
            positions.extend_from_slice(bucket);
        }
    }
    positions
}
