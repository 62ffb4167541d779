use std::io::{self, BufRead, Write};
use std::path::Path;

use ahash::AHashSet;

use crate::error::FilterError;
use crate::extract::ReadExtractor;
use crate::reader::{open_reader, open_writer};
use crate::types::DNASequence;

/// Streaming FASTQ reader over any buffered source.
pub struct FastqRecords<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> FastqRecords<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: String::new() }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim_end().to_string()))
    }

    fn read_record(&mut self) -> io::Result<Option<DNASequence>> {
        // 1) header, skipping anything that is not one
        let header_line = loop {
            match self.next_line()? {
                None => return Ok(None),
                Some(l) if l.starts_with('@') => break l,
                Some(_) => continue,
            }
        };
        // remove '@'
        let header_str = header_line[1..].to_string();

        let truncated = || {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated FASTQ record '{header_str}'"),
            )
        };
        // 2) sequence, 3) plus line, 4) quality
        let seq = self.next_line()?.ok_or_else(truncated)?;
        self.next_line()?.ok_or_else(truncated)?;
        let quals = self.next_line()?.ok_or_else(truncated)?;

        Ok(Some(DNASequence {
            id: header_str.split_whitespace().next().unwrap_or_default().to_string(),
            header_line: header_str.clone(),
            seq,
            quals,
        }))
    }
}

impl<R: BufRead> Iterator for FastqRecords<R> {
    type Item = io::Result<DNASequence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// FASTQ reader that also supports .gz
pub fn read_fastq_records<P: AsRef<Path>>(path: P) -> io::Result<FastqRecords<Box<dyn BufRead>>> {
    Ok(FastqRecords::new(open_reader(path)?))
}

/// Write the records whose ID is in `read_ids`, keeping the full header.
/// Returns the number of records written.
pub fn write_matching_records<R: BufRead, W: Write>(
    records: FastqRecords<R>,
    read_ids: &AHashSet<&str>,
    out: &mut W,
) -> io::Result<usize> {
    let mut written = 0;
    for record in records {
        let read = record?;
        if read_ids.contains(read.id.as_str()) {
            writeln!(out, "@{}\n{}\n+\n{}", read.header_line, read.seq, read.quals)?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}

/// Extracts reads natively by streaming the source FASTQ once.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastqExtractor;

impl ReadExtractor for FastqExtractor {
    fn extract(&self, source: &Path, read_ids: &[String], dest: &Path) -> Result<(), FilterError> {
        let failed = |e: io::Error| {
            FilterError::ExtractionFailed(format!(
                "could not copy reads from \"{}\" to \"{}\": {e}",
                source.display(),
                dest.display()
            ))
        };
        let wanted: AHashSet<&str> = read_ids.iter().map(String::as_str).collect();
        let records = read_fastq_records(source).map_err(failed)?;
        let mut out = open_writer(dest).map_err(failed)?;
        let written = write_matching_records(records, &wanted, &mut out).map_err(failed)?;
        if written < wanted.len() {
            log::warn!(
                "Only {written} of {} requested reads were found in \"{}\"",
                wanted.len(),
                source.display()
            );
        }
        log::debug!("Wrote {written} reads to \"{}\"", dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FASTQ: &str = "@r1 extra annotation\nACGT\n+\nIIII\n@r2\nGGCC\n+r2\nJJJJ\n@r3\nTTAA\n+\n####\n";

    #[test]
    fn test_parse_records() {
        let reads: Vec<DNASequence> = FastqRecords::new(FASTQ.as_bytes()).map(|r| r.unwrap()).collect();
        assert_eq!(reads.len(), 3);
        assert_eq!(reads[0].id, "r1");
        assert_eq!(reads[0].header_line, "r1 extra annotation");
        assert_eq!(reads[1].seq, "GGCC");
        assert_eq!(reads[2].quals, "####");
    }

    #[test]
    fn test_truncated_record_is_an_error() {
        let mut records = FastqRecords::new("@r1\nACGT\n+\n".as_bytes());
        let err = records.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_write_matching_records() {
        let wanted: AHashSet<&str> = ["r1", "r3", "missing"].into_iter().collect();
        let mut out = Vec::new();
        let n = write_matching_records(FastqRecords::new(FASTQ.as_bytes()), &wanted, &mut out).unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "@r1 extra annotation\nACGT\n+\nIIII\n@r3\nTTAA\n+\n####\n"
        );
    }

    #[test]
    fn test_extract_to_gz() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("reads.fq");
        let dest = dir.path().join("out.fq.gz");
        std::fs::write(&src, FASTQ).unwrap();

        FastqExtractor
            .extract(&src, &["r2".to_string()], &dest)
            .unwrap();

        let reads: Vec<DNASequence> = read_fastq_records(&dest).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].id, "r2");
    }

    #[test]
    fn test_extract_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = FastqExtractor.extract(
            &dir.path().join("nope.fq"),
            &["r1".to_string()],
            &dir.path().join("out.fq"),
        );
        assert!(matches!(result, Err(FilterError::ExtractionFailed(_))));
    }
}
