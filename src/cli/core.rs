
use anyhow::bail;
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::accuracy::AccuracySettings;
use crate::cli::aggregate::AggregateSettings;
use crate::cli::bed::BedSettings;
use crate::cli::compare::CompareSettings;
use crate::cli::extract::ExtractSettings;
use crate::cli::positions::PositionsSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2021-{}     varmatch authors
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// Varmatch, a tool for reconciling VCF calls with clinical reports and accuracy tables.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Checks whether each variant of a clinical report is present in the sample VCFs
    Compare(Box<CompareSettings>),
    /// Extracts depth and allele frequency for every VCF record into a single table
    Extract(Box<ExtractSettings>),
    /// Rolls benchmarking summaries up into INDEL, SNP, and ALL precision/recall tables
    Aggregate(Box<AggregateSettings>),
    /// Pairs CLC accuracy-table calls with annotated VCF calls by cDNA change
    Accuracy(Box<AccuracySettings>),
    /// Counts how many samples carry a variant at each position
    Positions(Box<PositionsSettings>),
    /// Converts a VCF into a BED file of variant intervals
    Bed(Box<BedSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.is_file() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks if a folder exists and will otherwise exit
/// # Arguments
/// * `folder` - the folder path to check for
/// * `label` - the label to use for error messages
pub fn check_required_folder(folder: &Path, label: &str) -> anyhow::Result<()> {
    if !folder.is_dir() {
        bail!("{} is not a folder: \"{}\"", label, folder.display());
    }

    // folder exists
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    use crate::cli::compare::PositionMatch;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from([
            "varmatch", "compare", "-i", "vcfs", "-f", "report.csv", "-o", "out",
            "--position-match", "exact", "--label", "MGC"
        ]).unwrap();
        match cli.command {
            Commands::Compare(settings) => {
                assert_eq!(settings.input_folder, PathBuf::from("vcfs"));
                assert_eq!(settings.position_match, PositionMatch::Exact);
                assert_eq!(settings.label, "MGC");
                assert_eq!(settings.threads, 1);
            },
            _ => panic!("expected compare")
        }

        let cli = Cli::try_parse_from(["varmatch", "positions", "-i", "vcfs", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Positions(settings) => assert_eq!(settings.exclude_pattern, "rep"),
            _ => panic!("expected positions")
        }

        let cli = Cli::try_parse_from(["varmatch", "bed", "-i", "S1_fp.vcf", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Bed(settings) => assert_eq!(settings.name_suffix, "_false_positive"),
            _ => panic!("expected bed")
        }

        // required arguments
        assert!(Cli::try_parse_from(["varmatch", "bed", "-o", "out"]).is_err());
    }
}
