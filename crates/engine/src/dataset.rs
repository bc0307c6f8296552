use std::collections::HashMap;

use chem::Toolkit;
use registry::FingerprintKind;

use crate::types::{CompoundRecord, RawCompoundRecord};

/// All precompiled data for one fingerprint kind.
///
/// Records and fingerprints are parallel arrays aligned by position; the
/// collection index maps every source-collection name to the positions of
/// its members. A dataset is built once by [`compile`] and never mutated;
/// reload replaces it wholesale.
#[derive(Debug, Clone)]
pub struct Dataset<F> {
    records: Vec<CompoundRecord>,
    fingerprints: Vec<F>,
    collections: HashMap<String, Vec<usize>>,
}

impl<F> Default for Dataset<F> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            fingerprints: Vec::new(),
            collections: HashMap::new(),
        }
    }
}

impl<F> Dataset<F> {
    fn push(&mut self, record: CompoundRecord, fingerprint: F) {
        let position = self.records.len();
        self.collections
            .entry(record.collection.clone())
            .or_default()
            .push(position);
        self.records.push(record);
        self.fingerprints.push(fingerprint);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, position: usize) -> &CompoundRecord {
        &self.records[position]
    }

    pub fn fingerprint(&self, position: usize) -> &F {
        &self.fingerprints[position]
    }

    pub fn records(&self) -> &[CompoundRecord] {
        &self.records
    }

    /// Positions of the members of `collection`, in storage order.
    pub fn positions(&self, collection: &str) -> Option<&[usize]> {
        self.collections.get(collection).map(Vec::as_slice)
    }

    /// Collection names present in this dataset, in no particular order.
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

/// Compile raw records into a dataset for one fingerprint kind.
///
/// Records whose structure fails to parse are dropped (warn-logged), never
/// fatal: one malformed compound must not abort compilation of the other
/// thousands. Fingerprints use the kind's default options, so compiled data
/// is never chirality-aware. A non-parse toolkit error aborts this kind only
/// and propagates to the caller, which omits the kind from the reload.
pub fn compile<T: Toolkit>(
    toolkit: &T,
    kind: &FingerprintKind,
    records: &[RawCompoundRecord],
) -> Result<Dataset<T::Fingerprint>, chem::ChemError> {
    let mut dataset = Dataset::default();
    for raw in records {
        let molecule = match toolkit.parse(&raw.structure) {
            Ok(molecule) => molecule,
            Err(err) if err.is_parse() => {
                tracing::warn!(id = %raw.id, error = %err, "skipping unparsable record");
                continue;
            }
            Err(err) => return Err(err),
        };
        let fingerprint = toolkit.fingerprint(&molecule, kind, &kind.default_options)?;
        dataset.push(CompoundRecord::from(raw), fingerprint);
    }
    tracing::debug!(
        kind = %kind.id,
        compiled = dataset.len(),
        skipped = records.len() - dataset.len(),
        "dataset compiled"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chem::NGramToolkit;

    fn sample_records() -> Vec<RawCompoundRecord> {
        vec![
            RawCompoundRecord::new("mol:benzene", "c1ccccc1").with_collection("chebi"),
            RawCompoundRecord::new("mol:ethanol", "CCO").with_collection("chebi"),
            RawCompoundRecord::new("mol:aspirin", "CC(=O)Oc1ccccc1C(=O)O")
                .with_collection("drugbank"),
            RawCompoundRecord::new("mol:orphan", "C=C"),
        ]
    }

    #[test]
    fn parallel_arrays_stay_aligned_and_buckets_partition_positions() {
        let toolkit = NGramToolkit::default();
        let kind = registry::find("morgan_ecfp").unwrap();
        let dataset = compile(&toolkit, kind, &sample_records()).unwrap();

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.records().len(), 4);
        for position in 0..dataset.len() {
            // Accessing the fingerprint for every record position must not
            // panic; the arrays are the same length.
            let _ = dataset.fingerprint(position);
        }

        let mut seen: Vec<usize> = dataset
            .collections()
            .flat_map(|name| dataset.positions(name).unwrap().to_vec())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);

        assert_eq!(dataset.positions("chebi"), Some(&[0, 1][..]));
        assert_eq!(dataset.positions("drugbank"), Some(&[2][..]));
        assert_eq!(dataset.positions("unknown"), Some(&[3][..]));
        assert_eq!(dataset.positions("absent"), None);
    }

    #[test]
    fn unparsable_records_are_dropped_and_order_is_preserved() {
        let toolkit = NGramToolkit::default();
        let kind = registry::find("pattern").unwrap();
        let mut records = sample_records();
        records.insert(
            1,
            RawCompoundRecord::new("mol:broken", "C1CC").with_collection("chebi"),
        );

        let dataset = compile(&toolkit, kind, &records).unwrap();
        assert_eq!(dataset.len(), 4);
        let ids: Vec<&str> = dataset
            .records()
            .iter()
            .map(|record| record.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec!["mol:benzene", "mol:ethanol", "mol:aspirin", "mol:orphan"]
        );
        // Positions shift down past the dropped record and the index follows.
        assert_eq!(dataset.positions("chebi"), Some(&[0, 1][..]));
    }

    #[test]
    fn compilation_is_deterministic() {
        let toolkit = NGramToolkit::default();
        let kind = registry::find("morgan_ecfp").unwrap();
        let records = sample_records();

        let first = compile(&toolkit, kind, &records).unwrap();
        let second = compile(&toolkit, kind, &records).unwrap();

        assert_eq!(first.records(), second.records());
        for position in 0..first.len() {
            assert_eq!(first.fingerprint(position), second.fingerprint(position));
        }
    }
}
