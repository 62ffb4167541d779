//src/kreport.rs

use std::io::BufRead;
use std::path::Path;

use crate::error::FilterError;
use crate::reader::open_reader;
use crate::types::{KrakenReportRow, TaxId};

/// Count the number of leading spaces in a report name column.
pub fn prefix_spaces(s: &str) -> usize {
    s.chars().take_while(|&c| c == ' ').count()
}

/// Parses a Kraken-style report file (Kraken2, Centrifuge `kreport`):
/// ```text
/// <pct>\t<clade reads>\t<taxon reads>\t<rank>\t<taxid>\t<indented name>
/// ```
/// Kraken2 reports written with `--report-minimizer-data` carry two extra
/// columns before the rank; rank, taxid and name are always the last three.
pub fn parse_kraken_report<P: AsRef<Path>>(path: P) -> Result<Vec<KrakenReportRow>, FilterError> {
    let reader = open_reader(path)?;
    parse_kraken_report_from(reader)
}

/// Same as [`parse_kraken_report`] over any buffered reader.
pub fn parse_kraken_report_from<R: BufRead>(reader: R) -> Result<Vec<KrakenReportRow>, FilterError> {
    let mut rows = Vec::new();

    for (i, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line_num = i + 1;
        let line = line.trim_end_matches(['\r', '\n']);

        // KrakenUniq-style comments and column headers
        if line.trim().is_empty() || line.starts_with('#') || line.starts_with('%') {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 6 {
            return Err(FilterError::MalformedReport {
                line: line_num,
                reason: format!("expected at least 6 tab-separated fields, found {}", parts.len()),
            });
        }

        let n = parts.len();
        let raw_name = parts[n - 1];
        let tax_id: TaxId = parse_field(parts[n - 2], "taxid", line_num)?;

        rows.push(KrakenReportRow {
            pct: parse_field(parts[0], "percentage", line_num)?,
            clade_reads: parse_field(parts[1], "clade read count", line_num)?,
            tax_reads: parse_field(parts[2], "taxon read count", line_num)?,
            rank: parts[n - 3].trim().to_string(),
            tax_id,
            tax_name: raw_name.trim().to_string(),
            indent: prefix_spaces(raw_name),
            line: line_num,
        });
    }

    log::debug!("Parsed {} Kraken-style report rows", rows.len());
    Ok(rows)
}

fn parse_field<T: std::str::FromStr>(s: &str, what: &str, line: usize) -> Result<T, FilterError> {
    s.trim().parse().map_err(|_| FilterError::MalformedReport {
        line,
        reason: format!("invalid {what} '{s}'"),
    })
}

/// True if any report row carries one of the given taxids.
pub fn report_has_any_taxid(rows: &[KrakenReportRow], taxids: &[TaxId]) -> bool {
    rows.iter().any(|row| taxids.contains(&row.tax_id))
}
