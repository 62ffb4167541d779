//src/results.rs

use std::io::BufRead;
use std::path::Path;

use ahash::AHashSet;

use crate::error::FilterError;
use crate::reader::open_reader;
use crate::types::{ClassificationRecord, Classifier, TaxId};

/// Per-read classification results of one classifier, in file order.
/// Centrifuge may report several rows for one read; all of them are kept.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    pub records: Vec<ClassificationRecord>,
}

impl ResultsTable {
    pub fn new(records: Vec<ClassificationRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassificationRecord> {
        self.records.iter()
    }

    /// Distinct read IDs present in the table.
    pub fn read_ids(&self) -> AHashSet<&str> {
        self.records.iter().map(|r| r.read_id.as_str()).collect()
    }

    /// Read IDs with at least one non-zero taxon assignment.
    pub fn classified_read_ids(&self) -> AHashSet<&str> {
        self.records
            .iter()
            .filter(|r| !r.is_unclassified())
            .map(|r| r.read_id.as_str())
            .collect()
    }
}

impl FromIterator<ClassificationRecord> for ResultsTable {
    fn from_iter<I: IntoIterator<Item = ClassificationRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Parse a results file in the format written by the given classifier.
pub fn parse_results<P: AsRef<Path>>(classifier: Classifier, path: P) -> Result<ResultsTable, FilterError> {
    let reader = open_reader(path)?;
    match classifier {
        Classifier::Centrifuge => parse_centrifuge_results_from(reader),
        Classifier::Kraken2 => parse_kraken2_results_from(reader),
    }
}

/// Parses Kraken2 per-read output (no header):
/// ```text
/// <C/U>\t<readID>\t<taxID>\t<length>\t<LCA mapping>
/// ```
/// With `--use-names` the taxID column reads `Name (taxid 1234)`.
pub fn parse_kraken2_results_from<R: BufRead>(reader: R) -> Result<ResultsTable, FilterError> {
    let mut records = Vec::new();

    for (i, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line_num = i + 1;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 3 {
            return Err(FilterError::MalformedResults {
                line: line_num,
                reason: format!("expected a read ID and a taxID column, found {} field(s)", parts.len()),
            });
        }

        let tax_id = parse_kraken2_taxid(parts[2]).ok_or_else(|| FilterError::MalformedResults {
            line: line_num,
            reason: format!("invalid taxID '{}'", parts[2]),
        })?;

        records.push(ClassificationRecord {
            read_id: parts[1].trim().to_string(),
            tax_id,
        });
    }

    Ok(ResultsTable::new(records))
}

/// Accepts `1234` or `Some name (taxid 1234)`.
fn parse_kraken2_taxid(field: &str) -> Option<TaxId> {
    let field = field.trim();
    if let Ok(taxid) = field.parse() {
        return Some(taxid);
    }
    let start = field.rfind("(taxid ")? + "(taxid ".len();
    let rest = &field[start..];
    let end = rest.find(')')?;
    rest[..end].trim().parse().ok()
}

/// Parses Centrifuge per-read output. The header row names the columns;
/// `readID` and `taxID` must be among them:
/// ```text
/// readID  seqID  taxID  score  2ndBestScore  hitLength  queryLength  numMatches
/// ```
pub fn parse_centrifuge_results_from<R: BufRead>(reader: R) -> Result<ResultsTable, FilterError> {
    let mut lines = reader.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => line?,
        None => {
            return Err(FilterError::MalformedResults {
                line: 1,
                reason: "missing header row".to_string(),
            })
        }
    };
    let columns: Vec<&str> = header.trim_end_matches(['\r', '\n']).split('\t').map(str::trim).collect();
    let column = |name: &str| {
        columns.iter().position(|&c| c == name).ok_or_else(|| FilterError::MalformedResults {
            line: 1,
            reason: format!("header is missing the '{name}' column"),
        })
    };
    let read_col = column("readID")?;
    let taxid_col = column("taxID")?;
    let min_fields = read_col.max(taxid_col) + 1;

    let mut records = Vec::new();
    for (i, line_result) in lines {
        let line = line_result?;
        let line_num = i + 1;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < min_fields {
            return Err(FilterError::MalformedResults {
                line: line_num,
                reason: format!("expected at least {min_fields} fields, found {}", parts.len()),
            });
        }
        let tax_id: TaxId = parts[taxid_col].trim().parse().map_err(|_| FilterError::MalformedResults {
            line: line_num,
            reason: format!("invalid taxID '{}'", parts[taxid_col]),
        })?;

        records.push(ClassificationRecord {
            read_id: parts[read_col].trim().to_string(),
            tax_id,
        });
    }

    Ok(ResultsTable::new(records))
}
