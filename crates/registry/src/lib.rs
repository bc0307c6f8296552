//! Static registry of fingerprint type descriptors.
//!
//! Every fingerprint encoding the search stack understands is described here
//! once, at process start, in a fixed table. Descriptors carry the default
//! option set used at compile time, the stereo overlay applied when a query
//! asks for chirality-aware encoding, and explainability metadata surfaced to
//! documentation and UI layers. Nothing in this crate is mutable at runtime.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Free-form option table for a fingerprint computation.
///
/// Kept as a JSON object rather than a fixed struct because each fingerprint
/// family understands a different set of knobs; toolkits read the keys they
/// know and ignore the rest.
pub type OptionMap = Map<String, Value>;

/// Qualitative confidence that a fingerprint's bits can be explained back to
/// concrete substructures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Algorithm family of a fingerprint kind.
///
/// The registry stays toolkit-agnostic: a descriptor names the family and a
/// concrete [`Toolkit`](https://docs.rs/mol-chem) implementation maps it onto
/// whatever generator it binds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FingerprintFamily {
    /// Atom-centered circular environments (Morgan). `functional` selects
    /// pharmacophoric atom invariants (FCFP) instead of exact atom types.
    Circular { functional: bool },
    /// Linear bond paths (Daylight-style topological fingerprint).
    Path,
    /// Pairs of atoms with their topological distance.
    AtomPair,
    /// Sequences of four bonded atoms.
    Torsion,
    /// Fixed dictionary of predefined structural keys (MACCS).
    Keys,
    /// Small substructure patterns; built for substructure screening.
    Pattern,
}

/// Explainability metadata for one fingerprint kind.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Explainability {
    pub level: Confidence,
    pub mechanism: &'static str,
    pub limitations: &'static str,
    pub typical_explanations: &'static [&'static str],
}

/// Immutable descriptor of one registered fingerprint kind.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FingerprintKind {
    /// Stable identifier used as the dataset key (e.g. `morgan_ecfp`).
    pub id: &'static str,
    /// Short display name (e.g. `ECFP`).
    pub short_name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Algorithm family the toolkit dispatches on.
    pub family: FingerprintFamily,
    /// Options applied when compiling datasets and, by default, queries.
    pub default_options: OptionMap,
    /// Overlay merged over the defaults for chirality-aware encoding.
    pub stereo_options: OptionMap,
    pub explainability: Explainability,
}

impl FingerprintKind {
    /// Effective option table for a query-side fingerprint computation.
    ///
    /// Dataset compilation always uses `default_options`; queries merge the
    /// stereo overlay on top when chirality-aware matching was requested.
    pub fn query_options(&self, chirality: bool) -> OptionMap {
        let mut options = self.default_options.clone();
        if chirality {
            for (key, value) in &self.stereo_options {
                options.insert(key.clone(), value.clone());
            }
        }
        options
    }

    /// Serializable summary exposed by `list_fingerprint_types`.
    pub fn summary(&self) -> FingerprintSummary {
        FingerprintSummary {
            id: self.id.to_string(),
            short_name: self.short_name.to_string(),
            description: self.description.to_string(),
            mechanism: self.explainability.mechanism.to_string(),
        }
    }
}

/// Descriptor summary returned to callers listing the available kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintSummary {
    pub id: String,
    pub short_name: String,
    pub description: String,
    pub mechanism: String,
}

fn options(pairs: &[(&str, Value)]) -> OptionMap {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

static FINGERPRINTS: Lazy<Vec<FingerprintKind>> = Lazy::new(|| {
    vec![
        FingerprintKind {
            id: "morgan_ecfp",
            short_name: "ECFP",
            description: "Extended Connectivity Fingerprint (ECFP). Encodes \
                atom-centered circular environments up to a given radius. \
                Widely used for similarity search, clustering, and QSAR.",
            family: FingerprintFamily::Circular { functional: false },
            default_options: options(&[
                ("radius", json!(2)),
                ("fp_size", json!(2048)),
                ("include_chirality", json!(false)),
                ("use_bond_types", json!(true)),
                ("count_simulation", json!(false)),
            ]),
            stereo_options: options(&[("include_chirality", json!(true))]),
            explainability: Explainability {
                level: Confidence::High,
                mechanism: "Each bit corresponds to one or more atom-centered \
                    environments (atom index + radius). Bit-to-substructure \
                    mapping is available from the generator output.",
                limitations: "Bits are hashed; collisions are possible. One \
                    bit may correspond to multiple distinct substructures.",
                typical_explanations: &[
                    "Highlighted atom environments",
                    "Similarity maps",
                    "Per-atom importance aggregation",
                ],
            },
        },
        FingerprintKind {
            id: "morgan_fcfp",
            short_name: "FCFP",
            description: "Functional-Class Fingerprint (FCFP). Morgan \
                fingerprint using pharmacophoric atom features instead of \
                exact atom types.",
            family: FingerprintFamily::Circular { functional: true },
            default_options: options(&[
                ("radius", json!(2)),
                ("fp_size", json!(2048)),
                ("include_chirality", json!(false)),
                ("use_bond_types", json!(true)),
                ("count_simulation", json!(false)),
            ]),
            stereo_options: options(&[("include_chirality", json!(true))]),
            explainability: Explainability {
                level: Confidence::High,
                mechanism: "Same as ECFP, but environments are defined over \
                    functional roles (HBD, HBA, aromatic, charged, etc.).",
                limitations: "Chemical specificity is reduced compared to ECFP.",
                typical_explanations: &[
                    "Functional similarity",
                    "Scaffold hopping rationales",
                ],
            },
        },
        FingerprintKind {
            id: "rdk_topological",
            short_name: "RDK",
            description: "Topological (path-based) fingerprint. Encodes \
                linear bond paths similar to Daylight fingerprints.",
            family: FingerprintFamily::Path,
            default_options: options(&[
                ("min_path", json!(1)),
                ("max_path", json!(7)),
                ("fp_size", json!(2048)),
                ("use_hs", json!(true)),
                ("branched_paths", json!(true)),
            ]),
            stereo_options: options(&[]),
            explainability: Explainability {
                level: Confidence::High,
                mechanism: "Each bit corresponds to one or more explicit bond \
                    paths. Exact atom and bond indices can be recovered from \
                    the generator output.",
                limitations: "Sensitive to small structural changes; less \
                    robust for scaffold hopping.",
                typical_explanations: &[
                    "Exact substructure paths",
                    "Bond-path highlighting",
                ],
            },
        },
        FingerprintKind {
            id: "atom_pair",
            short_name: "AP",
            description: "Atom Pair fingerprint. Encodes pairs of atoms along \
                with their topological distance.",
            family: FingerprintFamily::AtomPair,
            default_options: options(&[]),
            stereo_options: options(&[]),
            explainability: Explainability {
                level: Confidence::Medium,
                mechanism: "Each feature represents a pair of atoms at a \
                    given distance. Explanations identify which atom pairs \
                    contributed.",
                limitations: "No connected subgraph; explanations are \
                    relational rather than structural.",
                typical_explanations: &[
                    "Activity cliff analysis",
                    "Long-range interaction reasoning",
                ],
            },
        },
        FingerprintKind {
            id: "topological_torsion",
            short_name: "TT",
            description: "Topological Torsion fingerprint. Encodes sequences \
                of four bonded atoms.",
            family: FingerprintFamily::Torsion,
            default_options: options(&[]),
            stereo_options: options(&[]),
            explainability: Explainability {
                level: Confidence::Medium,
                mechanism: "Each feature corresponds to a specific 4-atom \
                    sequence (A-B-C-D).",
                limitations: "Local view only; torsions are hashed in \
                    bit-vector form.",
                typical_explanations: &[
                    "Linker characterization",
                    "Conformation-sensitive similarity",
                ],
            },
        },
        FingerprintKind {
            id: "maccs",
            short_name: "MACCS",
            description: "MACCS structural keys (166 bits). Each bit \
                corresponds to a predefined chemical pattern.",
            family: FingerprintFamily::Keys,
            default_options: options(&[]),
            stereo_options: options(&[]),
            explainability: Explainability {
                level: Confidence::VeryHigh,
                mechanism: "Each bit has a fixed semantic meaning defined in \
                    the MACCS specification.",
                limitations: "Low resolution; many subtle SAR effects are not \
                    captured.",
                typical_explanations: &[
                    "Human-readable feature presence",
                    "Medicinal chemistry reports",
                ],
            },
        },
        FingerprintKind {
            id: "pattern",
            short_name: "Pattern",
            description: "Pattern fingerprint. Designed for substructure \
                screening.",
            family: FingerprintFamily::Pattern,
            default_options: options(&[("fp_size", json!(2048))]),
            stereo_options: options(&[]),
            explainability: Explainability {
                level: Confidence::Low,
                mechanism: "Bits correspond to various small \
                    substructures/paths. Mainly used for pre-filtering \
                    substructure matches.",
                limitations: "High collision rate; screening only.",
                typical_explanations: &["Substructure screening"],
            },
        },
    ]
});

/// All registered kinds, in table-definition order.
pub fn all() -> &'static [FingerprintKind] {
    &FINGERPRINTS
}

/// Look up a kind by identifier.
pub fn find(id: &str) -> Option<&'static FingerprintKind> {
    FINGERPRINTS.iter().find(|kind| kind.id == id)
}
