pub mod aggregate;
pub mod resolve_reads;

use ahash::AHashSet;

pub use super::results::ResultsTable;
pub use super::taxtree::{TaxonClosure, TaxonomyTree};

/// One classifier's resolved reads.
#[derive(Debug, Clone, Default)]
pub struct ClassifierResultSet {
    /// Reads assigned to a taxon in the target closure
    pub targets: AHashSet<String>,
    /// Reads assigned to the unclassified sentinel taxid
    pub unclassified: AHashSet<String>,
    /// Raw results table, kept for cross-classifier comparison
    pub results: ResultsTable,
}
