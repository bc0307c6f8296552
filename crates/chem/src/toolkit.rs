use registry::{FingerprintKind, OptionMap};
use thiserror::Error;

/// Errors produced by a chemistry toolkit.
///
/// `Parse` is a domain-input failure: the engine resolves it locally (a
/// skipped record, an empty result set). Every other variant is an
/// infrastructure failure and propagates to the caller unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChemError {
    /// The structure string is invalid or unparsable.
    #[error("unparsable structure `{structure}`: {reason}")]
    Parse { structure: String, reason: String },
    /// The toolkit has no generator for the requested fingerprint kind.
    #[error("fingerprint kind `{0}` is not supported by this toolkit")]
    UnsupportedKind(String),
    /// Any other toolkit failure (native library error, resource exhaustion).
    #[error("toolkit failure: {0}")]
    Internal(String),
}

impl ChemError {
    pub fn parse(structure: impl Into<String>, reason: impl Into<String>) -> Self {
        ChemError::Parse {
            structure: structure.into(),
            reason: reason.into(),
        }
    }

    /// True for domain-input parse failures, which callers resolve locally
    /// instead of propagating.
    pub fn is_parse(&self) -> bool {
        matches!(self, ChemError::Parse { .. })
    }
}

/// Capability interface required from a chemistry toolkit.
///
/// Implementations must be shareable across search threads; all methods take
/// `&self` and must be internally thread-safe.
pub trait Toolkit: Send + Sync {
    /// Opaque parsed-structure handle.
    type Molecule;
    /// Opaque fingerprint value.
    type Fingerprint: Clone + PartialEq + Send + Sync;

    /// Parse a structure string into a molecule handle.
    fn parse(&self, structure: &str) -> Result<Self::Molecule, ChemError>;

    /// Compute the fingerprint of `molecule` for `kind` under `options`.
    ///
    /// `options` is the already-merged effective table (defaults plus any
    /// stereo overlay); implementations read the keys they understand.
    fn fingerprint(
        &self,
        molecule: &Self::Molecule,
        kind: &FingerprintKind,
        options: &OptionMap,
    ) -> Result<Self::Fingerprint, ChemError>;

    /// Tanimoto-style similarity of `query` against every target, in target
    /// order. Scores are in `[0, 1]` and the output length equals
    /// `targets.len()`.
    ///
    /// One call scores the whole candidate set; per-pair round trips dominate
    /// latency at realistic dataset sizes.
    fn bulk_similarity(&self, query: &Self::Fingerprint, targets: &[&Self::Fingerprint])
        -> Vec<f64>;

    /// Bit-set containment: every feature set in `query` is also set in
    /// `target`. A necessary (not sufficient) condition for substructure
    /// containment, used as the cheap screening test.
    fn screens(&self, query: &Self::Fingerprint, target: &Self::Fingerprint) -> bool;

    /// Exact count of `pattern` occurrences inside `molecule`, honoring
    /// stereochemistry when `chirality` is set.
    fn match_count(
        &self,
        molecule: &Self::Molecule,
        pattern: &Self::Molecule,
        chirality: bool,
    ) -> usize;
}
