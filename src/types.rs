//src/types.rs

use std::fmt;

/// NCBI Taxonomy ID as found in reports and results tables.
pub type TaxId = u32;

/// Sentinel taxon ID that classifiers assign to unclassified reads.
pub const UNCLASSIFIED_TAXID: TaxId = 0;

/// Taxon ID of the synthetic root node.
pub const ROOT_TAXID: TaxId = 1;

/// Superkingdom Viruses: https://www.ncbi.nlm.nih.gov/taxonomy/10239
pub const VIRUSES_TAXID: TaxId = 10239;

/// The classifiers whose output we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classifier {
    Centrifuge,
    Kraken2,
}

impl Classifier {
    /// Display name used in log messages.
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::Centrifuge => "Centrifuge",
            Classifier::Kraken2 => "Kraken2",
        }
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A structured representation of one row in a Kraken-style report.
/// For example:
///  %  reads  taxReads  rank  taxID  taxName
#[derive(Debug, Clone)]
pub struct KrakenReportRow {
    pub pct: f32,
    pub clade_reads: u64,
    pub tax_reads: u64,
    pub rank: String,
    pub tax_id: TaxId,
    /// Scientific name with the leading indentation stripped
    pub tax_name: String,
    /// Number of leading spaces in the raw name column
    pub indent: usize,
    /// 1-based line number in the report, for error messages
    pub line: usize,
}

/// One row of a classifier's per-read results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub read_id: String,
    pub tax_id: TaxId,
}

impl ClassificationRecord {
    pub fn is_unclassified(&self) -> bool {
        self.tax_id == UNCLASSIFIED_TAXID
    }
}

/// A minimal representation of a FASTQ read.
#[derive(Debug, Clone)]
pub struct DNASequence {
    pub id: String,
    pub header_line: String,
    pub seq: String,
    pub quals: String,
}
