// src/lib.rs
pub mod types;
pub mod error;
pub mod reader;
pub mod kreport;
pub mod results;
pub mod taxtree;
pub mod classify;
pub mod fastq;
pub mod extract;

use std::num::ParseIntError;
use std::path::PathBuf;

use crate::classify::aggregate::{ReconciliationReport, TargetClassifiedReads};
use crate::classify::resolve_reads::find_target_read_ids;
use crate::error::FilterError;
use crate::extract::ReadExtractor;
use crate::types::{Classifier, TaxId};

/// A classifier's per-read results file and its Kraken-style report.
#[derive(Debug, Clone)]
pub struct ClassifierInputs {
    pub results: PathBuf,
    pub kreport: PathBuf,
}

/// Everything one filtering run needs.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Single-end reads, or forward reads when paired
    pub reads1: PathBuf,
    pub reads2: Option<PathBuf>,
    pub output1: PathBuf,
    pub output2: Option<PathBuf>,
    pub centrifuge: Option<ClassifierInputs>,
    pub kraken2: Option<ClassifierInputs>,
    pub exclude_unclassified: bool,
    /// Target taxids; Viruses when `None`
    pub taxids: Option<Vec<TaxId>>,
}

impl FilterOptions {
    /// Classifier inputs that were supplied, in processing order.
    pub fn classifier_inputs(&self) -> Vec<(Classifier, &ClassifierInputs)> {
        [
            (Classifier::Centrifuge, self.centrifuge.as_ref()),
            (Classifier::Kraken2, self.kraken2.as_ref()),
        ]
        .into_iter()
        .filter_map(|(c, inputs)| inputs.map(|i| (c, i)))
        .collect()
    }
}

/// Outcome of [`filter_classified_reads`].
#[derive(Debug)]
pub struct FilterSummary {
    /// Sorted read IDs that were selected for output
    pub read_ids: Vec<String>,
    pub target_reads: usize,
    pub common_unclassified_reads: usize,
    pub reconciliation: Option<ReconciliationReport>,
}

/// Parse a comma-delimited list of taxids such as `"1,2,3"`, ignoring
/// surrounding whitespace.
pub fn parse_taxids(taxids: &str) -> Result<Vec<TaxId>, ParseIntError> {
    taxids.split(',').map(|x| x.trim().parse()).collect()
}

/// Resolve every supplied classifier in turn.
pub fn collect_classified_reads(
    options: &FilterOptions,
) -> Result<TargetClassifiedReads, FilterError> {
    let mut tcr = TargetClassifiedReads::new();
    for (classifier, inputs) in options.classifier_inputs() {
        let result_set = find_target_read_ids(
            classifier,
            &inputs.kreport,
            &inputs.results,
            options.taxids.as_deref(),
        )?;
        tcr.insert(classifier, result_set)?;
    }
    Ok(tcr)
}

/// Select target (and, unless excluded, commonly unclassified) reads from
/// the classification results and extract them into the output file(s).
pub fn filter_classified_reads(
    options: &FilterOptions,
    extractor: &dyn ReadExtractor,
) -> Result<FilterSummary, FilterError> {
    let tcr = collect_classified_reads(options)?;

    let target_reads = tcr.union_of_targets().len();
    let common_unclassified_reads = tcr.common_unclassified()?.len();
    let reconciliation = tcr.reconciliation_report();
    if let Some(report) = &reconciliation {
        report.log();
    }

    let read_ids = tcr.select_read_ids(!options.exclude_unclassified)?;
    if read_ids.is_empty() {
        if options.exclude_unclassified {
            log::warn!("No reads found for taxa of interest!");
        } else {
            log::warn!("No reads found for taxa of interest including unclassified!");
        }
    } else {
        let pairs = std::iter::once((&options.reads1, &options.output1))
            .chain(options.reads2.as_ref().zip(options.output2.as_ref()));
        for (source, dest) in pairs {
            log::info!(
                "Writing n={} filtered reads from \"{}\" to \"{}\"",
                read_ids.len(),
                source.display(),
                dest.display()
            );
            extractor.extract(source, &read_ids, dest)?;
        }
    }

    Ok(FilterSummary {
        read_ids,
        target_reads,
        common_unclassified_reads,
        reconciliation,
    })
}
