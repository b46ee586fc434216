use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::core::library::ReferenceLibrary;
use crate::counting::counter::SampleCountTable;

/// Where the rows of an aggregated table come from
#[derive(Debug, Clone, Copy)]
pub enum RowSource<'a> {
    /// Every library entry, `_other` last
    Reference(&'a ReferenceLibrary),
    /// Candidates reaching `min_count` in at least one sample
    ReferenceFree { min_count: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedRow {
    /// Barcode sequence, or the candidate sequence in reference-free mode
    pub key: String,
    pub label: String,
    /// One cell per sample, in the table's sample order
    pub counts: Vec<u64>,
}

/// Multi-sample count table: rows are barcodes or candidates, columns are
/// samples sorted by identifier
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedTable {
    samples: Vec<String>,
    rows: Vec<AggregatedRow>,
}

impl AggregatedTable {
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn rows(&self) -> &[AggregatedRow] {
        &self.rows
    }

    pub fn row(&self, key: &str) -> Option<&AggregatedRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Cell lookup by row key and sample identifier
    pub fn get(&self, key: &str, sample: &str) -> Option<u64> {
        let column = self.samples.iter().position(|s| s == sample)?;
        self.row(key).map(|row| row.counts[column])
    }
}

/// Merge finalized per-sample tables into one table.
///
/// Samples that never saw a row's key get a zero. Reference-free rows are
/// ordered by their total count across samples, then by sequence.
pub fn aggregate(tables: &[SampleCountTable], source: RowSource<'_>) -> AggregatedTable {
    let mut ordered: Vec<&SampleCountTable> = tables.iter().collect();
    ordered.sort_by(|a, b| a.sample().cmp(b.sample()));

    let samples: Vec<String> = ordered.iter().map(|t| t.sample().to_string()).collect();
    let lookups: Vec<HashMap<&str, u64>> = ordered
        .iter()
        .map(|t| t.rows().iter().map(|r| (r.key.as_str(), r.count)).collect())
        .collect();
    let cells = |key: &str| -> Vec<u64> {
        lookups
            .iter()
            .map(|lookup| lookup.get(key).copied().unwrap_or(0))
            .collect()
    };

    let rows = match source {
        RowSource::Reference(library) => library
            .entries()
            .iter()
            .map(|entry| AggregatedRow {
                key: entry.sequence.clone(),
                label: entry.label.clone(),
                counts: cells(&entry.sequence),
            })
            .collect(),
        RowSource::ReferenceFree { min_count } => {
            let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
            for table in &ordered {
                for row in table.classified_rows() {
                    if row.count >= min_count {
                        totals.entry(row.key.as_str()).or_insert(0);
                    }
                }
            }
            for lookup in &lookups {
                for (key, total) in &mut totals {
                    *total += lookup.get(key).copied().unwrap_or(0);
                }
            }

            let mut keys: Vec<(&str, u64)> = totals.into_iter().collect();
            keys.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            keys.into_iter()
                .map(|(key, _)| AggregatedRow {
                    key: key.to_string(),
                    label: key.to_string(),
                    counts: cells(key),
                })
                .collect()
        }
    };

    AggregatedTable { samples, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BarcodeId, ClassificationOutcome, OTHER_LABEL};
    use crate::counting::counter::SampleCounter;

    fn library() -> ReferenceLibrary {
        ReferenceLibrary::from_records(vec![(2, "AAAACCCC", "gene1"), (3, "GGGGTTTT", "gene2")])
            .unwrap()
    }

    fn free_table(sample: &str, regions: &[(&str, usize)]) -> SampleCountTable {
        let mut counter = SampleCounter::new(sample, None);
        for &(region, n) in regions {
            for _ in 0..n {
                counter.record(ClassificationOutcome::CandidateFound(region.to_string()));
            }
        }
        counter.finish()
    }

    #[test]
    fn test_reference_rows_are_zero_filled() {
        let library = library();
        let mut b = SampleCounter::new("b", Some(&library));
        b.record(ClassificationOutcome::Matched(BarcodeId(0)));
        b.record(ClassificationOutcome::UnmatchedNoFlank);
        let a = SampleCounter::new("a", Some(&library));

        let table = aggregate(&[b.finish(), a.finish()], RowSource::Reference(&library));

        assert_eq!(table.samples(), &["a".to_string(), "b".to_string()]);
        let labels: Vec<&str> = table.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["gene1", "gene2", OTHER_LABEL]);
        assert_eq!(table.get("AAAACCCC", "a"), Some(0));
        assert_eq!(table.get("AAAACCCC", "b"), Some(1));
        assert_eq!(table.get(OTHER_LABEL, "b"), Some(1));
        assert_eq!(table.get("GGGGTTTT", "b"), Some(0));
    }

    #[test]
    fn test_disjoint_candidates_are_zero_filled() {
        let s1 = free_table("s1", &[("AAAA", 6)]);
        let s2 = free_table("s2", &[("CCCC", 7)]);

        let table = aggregate(&[s1, s2], RowSource::ReferenceFree { min_count: 5 });

        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.get("AAAA", "s1"), Some(6));
        assert_eq!(table.get("AAAA", "s2"), Some(0));
        assert_eq!(table.get("CCCC", "s1"), Some(0));
        assert_eq!(table.get("CCCC", "s2"), Some(7));
        // Higher total first
        assert_eq!(table.rows()[0].key, "CCCC");
    }

    #[test]
    fn test_candidates_below_threshold_everywhere_are_dropped() {
        let s1 = free_table("s1", &[("AAAA", 5), ("TTTT", 4)]);
        let s2 = free_table("s2", &[("TTTT", 4), ("AAAA", 1)]);

        let table = aggregate(&[s1, s2], RowSource::ReferenceFree { min_count: 5 });

        assert!(table.row("TTTT").is_none());
        assert_eq!(table.row("AAAA").unwrap().counts, vec![5, 1]);
    }
}
