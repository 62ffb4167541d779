//src/extract.rs

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::FilterError;
use crate::reader::open_writer;

/// Copies the reads with the given IDs from a source read file into a new
/// file. Read IDs arrive sorted.
pub trait ReadExtractor {
    fn extract(&self, source: &Path, read_ids: &[String], dest: &Path) -> Result<(), FilterError>;
}

/// Check that a binary exists and, if a version marker is given, return the
/// version printed after it (e.g. `Version: 1.3-r106`).
pub fn check_bin(bin: &str, version_marker: Option<&str>) -> Result<Option<String>, FilterError> {
    let output = Command::new(bin)
        .stdin(Stdio::null())
        .output()
        .map_err(|_| FilterError::MissingTool(bin.to_string()))?;

    let Some(marker) = version_marker else {
        return Ok(None);
    };
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = [stderr, stdout].iter().find_map(|text| {
        let text: &str = text;
        let start = text.find(marker)? + marker.len();
        text[start..].split_whitespace().next().map(str::to_string)
    });
    match version {
        Some(v) => Ok(Some(v)),
        None => Err(FilterError::MissingTool(bin.to_string())),
    }
}

/// Returns the installed seqtk version.
pub fn check_seqtk() -> Result<String, FilterError> {
    check_bin("seqtk", Some("Version:"))?.ok_or_else(|| FilterError::MissingTool("seqtk".to_string()))
}

/// Extracts reads with `seqtk subseq`, compressing the output when the
/// destination ends in ".gz".
#[derive(Debug, Clone)]
pub struct SeqtkExtractor {
    pub program: String,
}

impl Default for SeqtkExtractor {
    fn default() -> Self {
        Self { program: "seqtk".to_string() }
    }
}

impl ReadExtractor for SeqtkExtractor {
    fn extract(&self, source: &Path, read_ids: &[String], dest: &Path) -> Result<(), FilterError> {
        let failed = |what: &str, e: io::Error| {
            FilterError::ExtractionFailed(format!("{} subseq {}: {what}: {e}", self.program, source.display()))
        };

        let mut id_file = tempfile::Builder::new()
            .prefix("read_ids")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| failed("cannot create read ID list", e))?;
        for id in read_ids {
            writeln!(id_file, "{id}").map_err(|e| failed("cannot write read ID list", e))?;
        }
        id_file.flush().map_err(|e| failed("cannot write read ID list", e))?;

        log::debug!(
            "Running: {} subseq {} {} > {}",
            self.program,
            source.display(),
            id_file.path().display(),
            dest.display()
        );
        let mut child = Command::new(&self.program)
            .arg("subseq")
            .arg(source)
            .arg(id_file.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed("cannot start", e))?;

        let mut out = open_writer(dest).map_err(|e| failed("cannot create output", e))?;
        if let Some(mut stdout) = child.stdout.take() {
            io::copy(&mut stdout, &mut out).map_err(|e| failed("cannot write output", e))?;
        }
        out.flush().map_err(|e| failed("cannot write output", e))?;
        drop(out);

        let output = child.wait_with_output().map_err(|e| failed("did not finish", e))?;
        if !output.status.success() {
            return Err(FilterError::ExtractionFailed(format!(
                "{} subseq exited with code {}: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !dest.exists() {
            return Err(FilterError::ExtractionFailed(format!(
                "expected output \"{}\" was not created",
                dest.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary() {
        assert!(matches!(
            check_bin("surely-not-an-installed-binary-1234", None),
            Err(FilterError::MissingTool(_))
        ));
    }

    #[test]
    fn test_missing_program_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = SeqtkExtractor { program: "surely-not-an-installed-binary-1234".to_string() };
        let result = extractor.extract(
            &dir.path().join("in.fq"),
            &["r1".to_string()],
            &dir.path().join("out.fq"),
        );
        assert!(matches!(result, Err(FilterError::ExtractionFailed(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_fails_extraction() {
        // `false subseq ...` prints nothing and exits 1
        let dir = tempfile::tempdir().unwrap();
        let extractor = SeqtkExtractor { program: "false".to_string() };
        let result = extractor.extract(
            &dir.path().join("in.fq"),
            &["r1".to_string()],
            &dir.path().join("out.fq"),
        );
        assert!(matches!(result, Err(FilterError::ExtractionFailed(_))));
    }
}
