// src/classify/resolve_reads.rs

use std::path::Path;

use ahash::AHashSet;

use super::{ClassifierResultSet, ResultsTable, TaxonClosure, TaxonomyTree};
use crate::error::FilterError;
use crate::kreport::{parse_kraken_report, report_has_any_taxid};
use crate::results::parse_results;
use crate::types::{Classifier, KrakenReportRow, TaxId, VIRUSES_TAXID};

/// Read IDs assigned to the unclassified sentinel taxid.
pub fn unclassified_read_ids(results: &ResultsTable) -> AHashSet<String> {
    results
        .iter()
        .filter(|r| r.is_unclassified())
        .map(|r| r.read_id.clone())
        .collect()
}

/// Read IDs assigned to any taxid in `closure`.
pub fn target_read_ids(results: &ResultsTable, closure: &TaxonClosure) -> AHashSet<String> {
    results
        .iter()
        .filter(|r| !r.is_unclassified() && closure.contains(r.tax_id))
        .map(|r| r.read_id.clone())
        .collect()
}

/// True if the report has a row for one of the targets, or for Viruses
/// when no targets are given.
pub fn report_has_target(rows: &[KrakenReportRow], taxids: Option<&[TaxId]>) -> bool {
    match taxids {
        Some(t) if !t.is_empty() => report_has_any_taxid(rows, t),
        _ => report_has_any_taxid(rows, &[VIRUSES_TAXID]),
    }
}

/// Split one classifier's reads into target and unclassified sets.
///
/// Unclassified reads are always collected. Target reads are only collected
/// when `report_has_target` is set; otherwise the target set stays empty.
pub fn resolve(results: ResultsTable, closure: &TaxonClosure, report_has_target: bool) -> ClassifierResultSet {
    let unclassified = unclassified_read_ids(&results);
    let targets = if report_has_target {
        target_read_ids(&results, closure)
    } else {
        AHashSet::new()
    };
    ClassifierResultSet {
        targets,
        unclassified,
        results,
    }
}

/// Resolve one classifier from already parsed inputs.
///
/// The report is checked for the target taxids before the tree is built;
/// a report without them short-circuits to an empty target set.
pub fn resolve_classifier(
    classifier: Classifier,
    report_rows: &[KrakenReportRow],
    results: ResultsTable,
    taxids: Option<&[TaxId]>,
) -> Result<ClassifierResultSet, FilterError> {
    if !report_has_target(report_rows, taxids) {
        match taxids {
            Some(t) if !t.is_empty() => log::warn!(
                "No taxonomic classification matches to taxids={t:?} in {classifier} report"
            ),
            _ => log::warn!(
                "No taxonomic classification matches to Viruses taxid={VIRUSES_TAXID} in {classifier} report"
            ),
        }
        let result_set = resolve(results, &TaxonClosure::default(), false);
        log::info!(
            "Found {} unclassified reads from {classifier} results",
            result_set.unclassified.len()
        );
        return Ok(result_set);
    }

    let tree = TaxonomyTree::build(report_rows)?;
    let closure = tree.closure(taxids);
    let result_set = resolve(results, &closure, true);
    log::info!(
        "Found {} unclassified reads from {classifier} results",
        result_set.unclassified.len()
    );
    log::info!(
        "Found {} target reads from {classifier} results",
        result_set.targets.len()
    );
    Ok(result_set)
}

/// Parse a classifier's results table and Kraken-style report and resolve
/// its target and unclassified reads.
pub fn find_target_read_ids<P: AsRef<Path>, Q: AsRef<Path>>(
    classifier: Classifier,
    kreport: P,
    results: Q,
    taxids: Option<&[TaxId]>,
) -> Result<ClassifierResultSet, FilterError> {
    let (kreport, results) = (kreport.as_ref(), results.as_ref());

    log::info!("Parsing {classifier} results");
    let table = parse_results(classifier, results)?;
    log::info!(
        "Parsed n={} {classifier} result records from \"{}\"",
        table.len(),
        results.display()
    );

    let rows = parse_kraken_report(kreport)?;
    log::info!(
        "Parsed n={} {classifier} Kraken-style report records from \"{}\"",
        rows.len(),
        kreport.display()
    );
    if !report_has_target(&rows, taxids) {
        log::debug!(
            "Report \"{}\" lacks the target lineage; reads in \"{}\" will not be searched for targets",
            kreport.display(),
            results.display()
        );
    }

    resolve_classifier(classifier, &rows, table, taxids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kreport::parse_kraken_report_from;
    use crate::types::ClassificationRecord;

    const VIRAL_REPORT: &str = "\
 12.50\t1\t1\tU\t0\tunclassified
 87.50\t7\t0\tR\t1\troot
 12.50\t1\t1\tD\t2\t  Bacteria
 62.50\t5\t0\tD\t10239\t  Viruses
 37.50\t3\t3\tS\t100\t    Virus A
 25.00\t2\t2\tS\t200\t    Virus B
";

    fn table(rows: &[(&str, TaxId)]) -> ResultsTable {
        rows.iter()
            .map(|&(read_id, tax_id)| ClassificationRecord { read_id: read_id.to_string(), tax_id })
            .collect()
    }

    fn viral_table() -> ResultsTable {
        table(&[
            ("r1", 100),
            ("r2", 100),
            ("r3", 100),
            ("r4", 200),
            ("r5", 200),
            ("r6", 999),
            ("r7", 0),
        ])
    }

    #[test]
    fn test_default_viral_round_trip() {
        let rows = parse_kraken_report_from(VIRAL_REPORT.as_bytes()).unwrap();
        let set = resolve_classifier(Classifier::Kraken2, &rows, viral_table(), None).unwrap();
        assert_eq!(set.targets.len(), 5);
        assert_eq!(set.unclassified.len(), 1);
        assert!(set.unclassified.contains("r7"));
        assert!(!set.targets.contains("r6"));
        assert_eq!(set.results.len(), 7);
    }

    #[test]
    fn test_targets_and_unclassified_are_disjoint_subsets() {
        let rows = parse_kraken_report_from(VIRAL_REPORT.as_bytes()).unwrap();
        let set = resolve_classifier(Classifier::Centrifuge, &rows, viral_table(), Some(&[1])).unwrap();
        assert!(set.targets.is_disjoint(&set.unclassified));

        let all_ids = set.results.read_ids();
        assert!(set.targets.iter().all(|id| all_ids.contains(id.as_str())));
        assert!(set.unclassified.iter().all(|id| all_ids.contains(id.as_str())));
        // taxid 999 is not in this report's tree, even under root
        assert_eq!(set.targets.len(), 5);
    }

    #[test]
    fn test_explicit_target_subset() {
        let rows = parse_kraken_report_from(VIRAL_REPORT.as_bytes()).unwrap();
        let set = resolve_classifier(Classifier::Kraken2, &rows, viral_table(), Some(&[200])).unwrap();
        let mut targets: Vec<&String> = set.targets.iter().collect();
        targets.sort();
        assert_eq!(targets, vec!["r4", "r5"]);
    }

    #[test]
    fn test_absent_target_still_collects_unclassified() {
        let rows = parse_kraken_report_from(VIRAL_REPORT.as_bytes()).unwrap();
        let set = resolve_classifier(Classifier::Kraken2, &rows, viral_table(), Some(&[9606])).unwrap();
        assert!(set.targets.is_empty());
        assert_eq!(set.unclassified.len(), 1);
    }

    #[test]
    fn test_report_without_viruses_short_circuits() {
        // The malformed tail would fail tree construction if it were attempted
        let report = "100.00\t7\t0\tR\t1\troot\n 50.00\t1\t1\tD\t2\t      Bacteria\n";
        let rows = parse_kraken_report_from(report.as_bytes()).unwrap();
        let set = resolve_classifier(Classifier::Kraken2, &rows, viral_table(), None).unwrap();
        assert!(set.targets.is_empty());
        assert_eq!(set.unclassified.len(), 1);
    }

    #[test]
    fn test_malformed_report_is_fatal_for_classifier() {
        let report = "100.00\t7\t0\tR\t1\troot\n 50.00\t1\t1\tD\t10239\t      Viruses\n";
        let rows = parse_kraken_report_from(report.as_bytes()).unwrap();
        assert!(matches!(
            resolve_classifier(Classifier::Kraken2, &rows, viral_table(), None),
            Err(FilterError::MalformedReport { .. })
        ));
    }

    #[test]
    fn test_resolve_without_report_target() {
        let mut closure = TaxonClosure::default();
        closure.taxids.insert(100);
        let set = resolve(viral_table(), &closure, false);
        assert!(set.targets.is_empty());
        assert_eq!(set.unclassified.len(), 1);

        let set = resolve(viral_table(), &closure, true);
        assert_eq!(set.targets.len(), 3);
    }

    #[test]
    fn test_zero_in_closure_never_targets_unclassified() {
        let mut closure = TaxonClosure::default();
        closure.taxids.insert(0);
        closure.taxids.insert(100);
        let set = resolve(viral_table(), &closure, true);
        assert!(!set.targets.contains("r7"));
        assert!(set.targets.is_disjoint(&set.unclassified));
    }

    #[test]
    fn test_report_has_target() {
        let rows = parse_kraken_report_from(VIRAL_REPORT.as_bytes()).unwrap();
        assert!(report_has_target(&rows, None));
        assert!(report_has_target(&rows, Some(&[])));
        assert!(report_has_target(&rows, Some(&[2])));
        assert!(!report_has_target(&rows, Some(&[9606])));
    }
}
