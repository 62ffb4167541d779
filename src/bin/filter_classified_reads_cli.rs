use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use filter_classified_reads::extract::{check_seqtk, ReadExtractor, SeqtkExtractor};
use filter_classified_reads::fastq::FastqExtractor;
use filter_classified_reads::types::TaxId;
use filter_classified_reads::{filter_classified_reads, parse_taxids, ClassifierInputs, FilterOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Extractor {
    /// `seqtk subseq`
    Seqtk,
    /// Built-in streaming FASTQ filter
    Native,
}

/// Filter viral reads and unclassified based on classification results.
///
/// Requires either Kraken2 or Centrifuge classification results or both, and
/// a FASTQ (or two FASTQs if paired-end). Kraken-style reports are required
/// along with the per-read results for the taxonomic hierarchy.
#[derive(Parser, Debug)]
#[command(name = "filter-classified-reads", version, about)]
struct Cli {
    /// Single end reads or Forward reads if paired-end specified
    #[arg(short = 'i', long)]
    reads1: PathBuf,

    /// Reverse reads [optional]
    #[arg(short = 'I', long)]
    reads2: Option<PathBuf>,

    /// Centrifuge classification results
    #[arg(short = 'c', long)]
    centrifuge_results: Option<PathBuf>,

    /// Centrifuge Kraken-style report
    #[arg(short = 'C', long)]
    centrifuge_kreport: Option<PathBuf>,

    /// Kraken2 classification results
    #[arg(short = 'k', long)]
    kraken2_results: Option<PathBuf>,

    /// Kraken2 report
    #[arg(short = 'K', long)]
    kraken2_kreport: Option<PathBuf>,

    /// Filtered forward reads or single-end reads
    #[arg(short = 'o', long)]
    output1: PathBuf,

    /// Filtered reverse reads. Must be specified if providing paired end read input!
    #[arg(short = 'O', long)]
    output2: Option<PathBuf>,

    /// Do not include unclassified reads in the final output
    #[arg(long)]
    exclude_unclassified: bool,

    /// Optional NCBI Taxonomy ID(s), comma-delimited, e.g. "1,2,3,4"
    #[arg(long)]
    taxids: Option<String>,

    /// How reads are copied into the output files
    #[arg(long, value_enum, default_value_t = Extractor::Seqtk)]
    extractor: Extractor,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn usage_error(msg: &str) -> ! {
    Cli::command().error(ErrorKind::MissingRequiredArgument, msg).exit()
}

fn pair(results: Option<PathBuf>, kreport: Option<PathBuf>) -> Option<ClassifierInputs> {
    results.zip(kreport).map(|(results, kreport)| ClassifierInputs { results, kreport })
}

fn try_parse_taxids(taxids: Option<&str>) -> Option<Vec<TaxId>> {
    let taxids = taxids.filter(|t| !t.trim().is_empty())?;
    match parse_taxids(taxids) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::error!(
                "Could not parse \"taxids\" command-line argument ({taxids}): {e}. Setting to default value of \"None\""
            );
            None
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {}: {} [in {}:{}]",
                buf.timestamp(),
                record.level(),
                record.args(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0)
            )
        })
        .init();
}

fn spinner(color: &str, msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.centrifuge_results.is_none()
        && cli.centrifuge_kreport.is_none()
        && cli.kraken2_results.is_none()
        && cli.kraken2_kreport.is_none()
    {
        usage_error(
            "No Centrifuge or Kraken2 results and reports specified! Cannot filter on classification results.",
        );
    }
    if cli.centrifuge_results.is_some() != cli.centrifuge_kreport.is_some() {
        usage_error(
            "Both the Centrifuge results and Kraken-style report must be specified with `-c` for the results file and `-C` for the Kraken report file!",
        );
    }
    if cli.kraken2_results.is_some() != cli.kraken2_kreport.is_some() {
        usage_error(
            "Both the Kraken2 results and report files must be specified with `-k` for the results file and `-K` for the Kraken report file!",
        );
    }
    if cli.reads2.is_some() && cli.output2.is_none() {
        usage_error(
            "If paired reads are specified, you must specify an output file for the filtered reverse reads with `-O/--output2`!",
        );
    }

    init_logging(cli.verbose);

    let extractor: Box<dyn ReadExtractor> = match cli.extractor {
        Extractor::Seqtk => match check_seqtk() {
            Ok(version) => {
                log::info!("Using seqtk version {version}");
                Box::new(SeqtkExtractor::default())
            }
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        Extractor::Native => Box::new(FastqExtractor),
    };

    let options = FilterOptions {
        taxids: try_parse_taxids(cli.taxids.as_deref()),
        reads1: cli.reads1,
        reads2: cli.reads2,
        output1: cli.output1,
        output2: cli.output2,
        centrifuge: pair(cli.centrifuge_results, cli.centrifuge_kreport),
        kraken2: pair(cli.kraken2_results, cli.kraken2_kreport),
        exclude_unclassified: cli.exclude_unclassified,
    };

    let progress = spinner("green", "Filtering classified reads...");
    let result = filter_classified_reads(&options, extractor.as_ref());
    progress.finish_and_clear();

    match result {
        Ok(summary) => {
            log::info!(
                "Selected {} reads ({} target, {} commonly unclassified)",
                summary.read_ids.len(),
                summary.target_reads,
                summary.common_unclassified_reads
            );
            log::info!("Done!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_try_parse_taxids() {
        assert_eq!(try_parse_taxids(None), None);
        assert_eq!(try_parse_taxids(Some("")), None, "Empty strings must return None");
        assert_eq!(try_parse_taxids(Some("invalid")), None, "Invalid strings must return None");
        assert_eq!(try_parse_taxids(Some("1")), Some(vec![1]));
        assert_eq!(try_parse_taxids(Some("1,2,3")), Some(vec![1, 2, 3]));
        assert_eq!(try_parse_taxids(Some("\t1 \n,2 , 3\t ")), Some(vec![1, 2, 3]));
    }
}
