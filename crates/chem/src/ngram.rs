//! Built-in line-notation toolkit.
//!
//! [`NGramToolkit`] implements the [`Toolkit`] capability over the canonical
//! line notation itself: structures are validated textually and fingerprints
//! are seeded hashes of character n-grams. It is deterministic, fast, and has
//! no native dependencies, which makes it the toolkit of choice for tests,
//! demos, and datasets where a full cheminformatics stack is unavailable.
//!
//! The screening guarantee holds by construction: every n-gram of a
//! substring is an n-gram of the containing string, so a true substructure
//! (substring) match always passes the bit-containment screen.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rayon::prelude::*;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use registry::{FingerprintFamily, FingerprintKind, OptionMap};

use crate::toolkit::{ChemError, Toolkit};

/// Characters carrying stereochemical information in the line notation.
/// Stripped before hashing and matching unless chirality was requested.
const STEREO_MARKS: &[char] = &['@', '/', '\\'];

/// Characters legal in a structure string, besides ASCII alphanumerics.
const STRUCTURE_PUNCT: &str = "()[]=#+-./\\@%:";

/// Seed salt applied for functional-class (FCFP-style) circular variants.
const FUNCTIONAL_SALT: u64 = 0x632B_E5AB;

/// Fixed bit width of the structural-keys family.
const KEYS_BITS: u32 = 166;

/// Configuration for [`NGramToolkit`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NGramConfig {
    /// Seed for the n-gram feature hash. Fingerprints computed under
    /// different seeds are not comparable.
    #[serde(default = "NGramConfig::default_seed")]
    pub seed: u64,
    /// Score bulk-similarity targets on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
}

impl NGramConfig {
    pub(crate) fn default_seed() -> u64 {
        0x9E37_79B9_7F4A_7C15
    }
}

impl Default for NGramConfig {
    fn default() -> Self {
        Self {
            seed: Self::default_seed(),
            parallel: false,
        }
    }
}

/// Parsed-structure handle of the n-gram toolkit: the validated notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMolecule {
    notation: String,
}

impl LineMolecule {
    /// The validated notation string.
    pub fn notation(&self) -> &str {
        &self.notation
    }

    /// Notation with stereo marks stripped unless `stereo` is set.
    fn canonical(&self, stereo: bool) -> Cow<'_, str> {
        if stereo || !self.notation.contains(STEREO_MARKS) {
            Cow::Borrowed(&self.notation)
        } else {
            Cow::Owned(
                self.notation
                    .chars()
                    .filter(|ch| !STEREO_MARKS.contains(ch))
                    .collect(),
            )
        }
    }
}

/// Opaque fingerprint value of the n-gram toolkit.
///
/// Bit-set kinds hash n-grams into a fixed-width bitmap; the atom-pair and
/// torsion families keep sparse feature counts instead, matching the two
/// representations the real generators produce.
#[derive(Debug, Clone, PartialEq)]
pub enum NGramFingerprint {
    Bits(RoaringBitmap),
    Counts(BTreeMap<u32, u32>),
}

impl NGramFingerprint {
    fn tanimoto(&self, other: &Self) -> f64 {
        match (self, other) {
            (NGramFingerprint::Bits(a), NGramFingerprint::Bits(b)) => {
                let union = a.union_len(b);
                if union == 0 {
                    0.0
                } else {
                    a.intersection_len(b) as f64 / union as f64
                }
            }
            (NGramFingerprint::Counts(a), NGramFingerprint::Counts(b)) => {
                let total_a: u64 = a.values().map(|&v| u64::from(v)).sum();
                let total_b: u64 = b.values().map(|&v| u64::from(v)).sum();
                let shared: u64 = a
                    .iter()
                    .filter_map(|(key, &va)| b.get(key).map(|&vb| u64::from(va.min(vb))))
                    .sum();
                let denominator = total_a + total_b - shared;
                if denominator == 0 {
                    0.0
                } else {
                    shared as f64 / denominator as f64
                }
            }
            // Mixed representations are never produced for the same kind.
            _ => 0.0,
        }
    }

    /// True when every feature of `other` is present in `self`.
    fn contains(&self, other: &Self) -> bool {
        match (self, other) {
            (NGramFingerprint::Bits(outer), NGramFingerprint::Bits(inner)) => {
                inner.is_subset(outer)
            }
            (NGramFingerprint::Counts(outer), NGramFingerprint::Counts(inner)) => inner
                .iter()
                .all(|(key, &count)| outer.get(key).is_some_and(|&have| have >= count)),
            _ => false,
        }
    }
}

/// Deterministic line-notation toolkit.
#[derive(Debug, Clone, Default)]
pub struct NGramToolkit {
    config: NGramConfig,
}

impl NGramToolkit {
    pub fn new(config: NGramConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NGramConfig {
        &self.config
    }

    fn bit_grams(
        &self,
        text: &str,
        lengths: RangeInclusive<usize>,
        modulus: u32,
        seed: u64,
    ) -> RoaringBitmap {
        let bytes = text.as_bytes();
        let modulus = u64::from(modulus.max(1));
        let mut bits = RoaringBitmap::new();
        for length in lengths {
            if length == 0 || length > bytes.len() {
                continue;
            }
            for window in bytes.windows(length) {
                let hash = xxh3_64_with_seed(window, seed);
                bits.insert((hash % modulus) as u32);
            }
        }
        bits
    }

    fn torsion_counts(&self, text: &str) -> BTreeMap<u32, u32> {
        let mut counts = BTreeMap::new();
        for window in text.as_bytes().windows(4) {
            let key = xxh3_64_with_seed(window, self.config.seed) as u32;
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    fn atom_pair_counts(&self, text: &str) -> BTreeMap<u32, u32> {
        let bytes = text.as_bytes();
        let mut counts = BTreeMap::new();
        for (i, &first) in bytes.iter().enumerate() {
            for (offset, &second) in bytes[i + 1..].iter().enumerate() {
                let distance = (offset + 1).min(u8::MAX as usize) as u8;
                let feature = [first, second, distance];
                let key = xxh3_64_with_seed(&feature, self.config.seed) as u32;
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }
}

fn opt_u64(options: &OptionMap, key: &str, default: u64) -> u64 {
    options.get(key).and_then(Value::as_u64).unwrap_or(default)
}

fn opt_bool(options: &OptionMap, key: &str, default: bool) -> bool {
    options.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Validate a structure string: non-empty, legal character set, balanced
/// parentheses and brackets, and paired ring-closure digits.
fn validate(notation: &str) -> Result<(), String> {
    if notation.is_empty() {
        return Err("empty structure".to_string());
    }

    let mut paren_depth = 0i32;
    let mut bracket_depth = 0i32;
    let mut ring_digits: BTreeMap<char, u32> = BTreeMap::new();

    for ch in notation.chars() {
        if !ch.is_ascii_alphanumeric() && !STRUCTURE_PUNCT.contains(ch) {
            return Err(format!("illegal character `{ch}`"));
        }
        match ch {
            '(' => paren_depth += 1,
            ')' => {
                paren_depth -= 1;
                if paren_depth < 0 {
                    return Err("unbalanced parentheses".to_string());
                }
            }
            '[' => {
                bracket_depth += 1;
                if bracket_depth > 1 {
                    return Err("nested brackets".to_string());
                }
            }
            ']' => {
                bracket_depth -= 1;
                if bracket_depth < 0 {
                    return Err("unbalanced brackets".to_string());
                }
            }
            // Digits outside a bracket atom are ring-bond closures and must
            // come in pairs; digits inside brackets are counts or charges.
            _ if ch.is_ascii_digit() && bracket_depth == 0 => {
                *ring_digits.entry(ch).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    if paren_depth != 0 {
        return Err("unbalanced parentheses".to_string());
    }
    if bracket_depth != 0 {
        return Err("unbalanced brackets".to_string());
    }
    if let Some((digit, _)) = ring_digits.iter().find(|(_, &count)| count % 2 != 0) {
        return Err(format!("unpaired ring closure `{digit}`"));
    }
    Ok(())
}

/// Count (possibly overlapping) occurrences of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || needle.len() > haystack.len() {
        return 0;
    }
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}

impl Toolkit for NGramToolkit {
    type Molecule = LineMolecule;
    type Fingerprint = NGramFingerprint;

    fn parse(&self, structure: &str) -> Result<Self::Molecule, ChemError> {
        let trimmed = structure.trim();
        validate(trimmed).map_err(|reason| ChemError::parse(structure, reason))?;
        Ok(LineMolecule {
            notation: trimmed.to_string(),
        })
    }

    fn fingerprint(
        &self,
        molecule: &Self::Molecule,
        kind: &FingerprintKind,
        options: &OptionMap,
    ) -> Result<Self::Fingerprint, ChemError> {
        let stereo = opt_bool(options, "include_chirality", false);
        let text = molecule.canonical(stereo);

        let fingerprint = match kind.family {
            FingerprintFamily::Circular { functional } => {
                let radius = opt_u64(options, "radius", 2) as usize;
                let fp_size = opt_u64(options, "fp_size", 2048) as u32;
                let (text, seed) = if functional {
                    // Functional-class variant: fold case so notation-level
                    // atom classes collapse, and salt the hash space.
                    (
                        Cow::Owned(text.to_ascii_lowercase()),
                        self.config.seed ^ FUNCTIONAL_SALT,
                    )
                } else {
                    (text, self.config.seed)
                };
                NGramFingerprint::Bits(self.bit_grams(&text, 1..=radius + 1, fp_size, seed))
            }
            FingerprintFamily::Path => {
                let min_path = opt_u64(options, "min_path", 1) as usize;
                let max_path = opt_u64(options, "max_path", 7) as usize;
                let fp_size = opt_u64(options, "fp_size", 2048) as u32;
                NGramFingerprint::Bits(self.bit_grams(
                    &text,
                    min_path.max(1)..=max_path.max(min_path),
                    fp_size,
                    self.config.seed,
                ))
            }
            FingerprintFamily::Keys => {
                NGramFingerprint::Bits(self.bit_grams(&text, 1..=2, KEYS_BITS, self.config.seed))
            }
            FingerprintFamily::Pattern => {
                let fp_size = opt_u64(options, "fp_size", 2048) as u32;
                NGramFingerprint::Bits(self.bit_grams(&text, 1..=3, fp_size, self.config.seed))
            }
            FingerprintFamily::AtomPair => NGramFingerprint::Counts(self.atom_pair_counts(&text)),
            FingerprintFamily::Torsion => NGramFingerprint::Counts(self.torsion_counts(&text)),
        };
        Ok(fingerprint)
    }

    fn bulk_similarity(
        &self,
        query: &Self::Fingerprint,
        targets: &[&Self::Fingerprint],
    ) -> Vec<f64> {
        if self.config.parallel {
            targets
                .par_iter()
                .map(|target| query.tanimoto(target))
                .collect()
        } else {
            targets
                .iter()
                .map(|target| query.tanimoto(target))
                .collect()
        }
    }

    fn screens(&self, query: &Self::Fingerprint, target: &Self::Fingerprint) -> bool {
        target.contains(query)
    }

    fn match_count(
        &self,
        molecule: &Self::Molecule,
        pattern: &Self::Molecule,
        chirality: bool,
    ) -> usize {
        count_occurrences(&molecule.canonical(chirality), &pattern.canonical(chirality))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BENZENE: &str = "c1ccccc1";
    const PHENYLALANINE: &str = "[NH3+][C@@H](Cc1ccccc1)C(=O)[O-]";

    fn toolkit() -> NGramToolkit {
        NGramToolkit::default()
    }

    fn pattern_kind() -> &'static FingerprintKind {
        registry::find("pattern").unwrap()
    }

    fn pattern_fp(toolkit: &NGramToolkit, structure: &str) -> NGramFingerprint {
        let kind = pattern_kind();
        let molecule = toolkit.parse(structure).unwrap();
        toolkit
            .fingerprint(&molecule, kind, &kind.default_options)
            .unwrap()
    }

    #[test]
    fn parse_accepts_realistic_notations() {
        let toolkit = toolkit();
        assert!(toolkit.parse(BENZENE).is_ok());
        assert!(toolkit.parse(PHENYLALANINE).is_ok());
        assert!(toolkit.parse("CC(=O)Oc1ccccc1C(=O)O").is_ok());
    }

    #[test]
    fn parse_rejects_malformed_notations() {
        let toolkit = toolkit();
        for bad in ["", "   ", "C1CC", "CC(C", "C)C", "[NH3+", "not a molecule!"] {
            let err = toolkit.parse(bad).expect_err("should not parse");
            assert!(err.is_parse(), "{bad}: {err}");
        }
    }

    #[test]
    fn identical_structures_have_identical_fingerprints() {
        let toolkit = toolkit();
        let a = pattern_fp(&toolkit, BENZENE);
        let b = pattern_fp(&toolkit, BENZENE);
        assert_eq!(a, b);
        assert_eq!(toolkit.bulk_similarity(&a, &[&b]), vec![1.0]);
    }

    #[test]
    fn substring_fingerprint_screens_against_superstring() {
        let toolkit = toolkit();
        let query = pattern_fp(&toolkit, BENZENE);
        let target = pattern_fp(&toolkit, PHENYLALANINE);
        assert!(toolkit.screens(&query, &target));
        // The superstring carries features benzene lacks.
        assert!(!toolkit.screens(&target, &query));
    }

    #[test]
    fn match_count_counts_overlapping_occurrences() {
        let toolkit = toolkit();
        let ethanol = toolkit.parse("CCO").unwrap();
        let carbon = toolkit.parse("C").unwrap();
        assert_eq!(toolkit.match_count(&ethanol, &carbon, false), 2);

        let phe = toolkit.parse(PHENYLALANINE).unwrap();
        let ring = toolkit.parse(BENZENE).unwrap();
        assert_eq!(toolkit.match_count(&phe, &ring, false), 1);
        assert_eq!(toolkit.match_count(&ring, &phe, false), 0);
    }

    #[test]
    fn chirality_flag_controls_stereo_sensitivity() {
        let toolkit = toolkit();
        let target = toolkit.parse("N[C@@H](C)C(=O)O").unwrap();
        let achiral_pattern = toolkit.parse("[CH](C)").unwrap();
        let chiral_pattern = toolkit.parse("[C@H](C)").unwrap();

        // Stereo marks are stripped from both sides when chirality is off.
        assert_eq!(toolkit.match_count(&target, &achiral_pattern, false), 1);
        assert_eq!(toolkit.match_count(&target, &chiral_pattern, false), 1);
        // With chirality on, `@` differs from `@@` and the match is lost.
        assert_eq!(toolkit.match_count(&target, &chiral_pattern, true), 0);
    }

    #[test]
    fn stereo_options_change_the_fingerprint_only_when_marks_exist() {
        let toolkit = toolkit();
        let kind = registry::find("morgan_ecfp").unwrap();
        let phe = toolkit.parse(PHENYLALANINE).unwrap();

        let plain = toolkit
            .fingerprint(&phe, kind, &kind.query_options(false))
            .unwrap();
        let stereo = toolkit
            .fingerprint(&phe, kind, &kind.query_options(true))
            .unwrap();
        assert_ne!(plain, stereo);

        let benzene = toolkit.parse(BENZENE).unwrap();
        let plain = toolkit
            .fingerprint(&benzene, kind, &kind.query_options(false))
            .unwrap();
        let stereo = toolkit
            .fingerprint(&benzene, kind, &kind.query_options(true))
            .unwrap();
        assert_eq!(plain, stereo);
    }

    #[test]
    fn count_families_produce_sparse_counts() {
        let toolkit = toolkit();
        let kind = registry::find("atom_pair").unwrap();
        let ethanol = toolkit.parse("CCO").unwrap();
        let fp = toolkit
            .fingerprint(&ethanol, kind, &kind.default_options)
            .unwrap();
        match &fp {
            NGramFingerprint::Counts(counts) => assert!(!counts.is_empty()),
            NGramFingerprint::Bits(_) => panic!("atom_pair should be count-based"),
        }
        assert_eq!(toolkit.bulk_similarity(&fp, &[&fp]), vec![1.0]);

        let aspirin = toolkit.parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let other = toolkit
            .fingerprint(&aspirin, kind, &kind.default_options)
            .unwrap();
        let scores = toolkit.bulk_similarity(&fp, &[&other]);
        assert!(scores[0] < 1.0);
        assert!(scores[0] >= 0.0);
    }

    #[test]
    fn keys_family_stays_within_its_fixed_width() {
        let toolkit = toolkit();
        let kind = registry::find("maccs").unwrap();
        let aspirin = toolkit.parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        match toolkit
            .fingerprint(&aspirin, kind, &kind.default_options)
            .unwrap()
        {
            NGramFingerprint::Bits(bits) => {
                assert!(bits.max().is_some_and(|bit| bit < KEYS_BITS));
            }
            NGramFingerprint::Counts(_) => panic!("maccs should be bit-based"),
        }
    }

    #[test]
    fn functional_variant_differs_from_exact_variant() {
        let toolkit = toolkit();
        let ecfp = registry::find("morgan_ecfp").unwrap();
        let fcfp = registry::find("morgan_fcfp").unwrap();
        let aspirin = toolkit.parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();

        let exact = toolkit
            .fingerprint(&aspirin, ecfp, &ecfp.default_options)
            .unwrap();
        let functional = toolkit
            .fingerprint(&aspirin, fcfp, &fcfp.default_options)
            .unwrap();
        assert_ne!(exact, functional);
    }

    #[test]
    fn parallel_scoring_matches_sequential_scoring() {
        let sequential = NGramToolkit::default();
        let parallel = NGramToolkit::new(NGramConfig {
            parallel: true,
            ..NGramConfig::default()
        });

        let query = pattern_fp(&sequential, BENZENE);
        let targets = vec![
            pattern_fp(&sequential, PHENYLALANINE),
            pattern_fp(&sequential, "CCO"),
            pattern_fp(&sequential, BENZENE),
        ];
        let refs: Vec<&NGramFingerprint> = targets.iter().collect();

        assert_eq!(
            sequential.bulk_similarity(&query, &refs),
            parallel.bulk_similarity(&query, &refs)
        );
    }

    #[test]
    fn scores_are_bounded() {
        let toolkit = toolkit();
        let query = pattern_fp(&toolkit, BENZENE);
        let targets = vec![
            pattern_fp(&toolkit, PHENYLALANINE),
            pattern_fp(&toolkit, "CCO"),
            pattern_fp(&toolkit, "CC(=O)Oc1ccccc1C(=O)O"),
        ];
        let refs: Vec<&NGramFingerprint> = targets.iter().collect();
        for score in toolkit.bulk_similarity(&query, &refs) {
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
