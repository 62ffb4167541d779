#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const KREPORT: &str = "\
 10.00\t1\t1\tU\t0\tunclassified
 90.00\t9\t0\tR\t1\troot
 20.00\t2\t0\tR1\t131567\t  cellular organisms
 20.00\t2\t2\tD\t2\t    Bacteria
 60.00\t6\t0\tD\t10239\t  Viruses
 40.00\t4\t4\tS\t100\t    Virus A
 20.00\t2\t2\tS\t200\t    Virus B
";

/// Ten reads: read0-read5 viral, read6-read7 bacterial, read8-read9 unclassified.
pub fn read_taxids() -> Vec<(String, u32)> {
    (0..10)
        .map(|i| {
            let taxid = match i {
                0..=3 => 100,
                4..=5 => 200,
                6..=7 => 2,
                _ => 0,
            };
            (format!("read{i}"), taxid)
        })
        .collect()
}

pub fn kraken2_results(rows: &[(String, u32)]) -> String {
    rows.iter()
        .map(|(id, taxid)| {
            let status = if *taxid == 0 { 'U' } else { 'C' };
            format!("{status}\t{id}\t{taxid}\t150\t{taxid}:116\n")
        })
        .collect()
}

pub fn centrifuge_results(rows: &[(String, u32)]) -> String {
    let mut text = String::from("readID\tseqID\ttaxID\tscore\t2ndBestScore\thitLength\tqueryLength\tnumMatches\n");
    for (id, taxid) in rows {
        let seq_id = if *taxid == 0 { "unclassified" } else { "NC_000001" };
        text.push_str(&format!("{id}\t{seq_id}\t{taxid}\t900\t0\t45\t150\t1\n"));
    }
    text
}

pub fn fastq(rows: &[(String, u32)]) -> String {
    rows.iter()
        .map(|(id, _)| format!("@{id} sample=1\nACGTACGT\n+\nIIIIIIII\n"))
        .collect()
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let rows = read_taxids();
        fs::write(dir.path().join("reads_1.fq"), fastq(&rows)).unwrap();
        fs::write(dir.path().join("reads_2.fq"), fastq(&rows)).unwrap();
        fs::write(dir.path().join("kraken2.kreport"), KREPORT).unwrap();
        fs::write(dir.path().join("kraken2.tsv"), kraken2_results(&rows)).unwrap();
        fs::write(dir.path().join("centrifuge.kreport"), KREPORT).unwrap();
        fs::write(dir.path().join("centrifuge.tsv"), centrifuge_results(&rows)).unwrap();
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// IDs of the records in a FASTQ file.
pub fn fastq_ids(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .step_by(4)
        .map(|l| l.trim_start_matches('@').split(' ').next().unwrap().to_string())
        .collect()
}
