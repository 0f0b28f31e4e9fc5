
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use strum_macros::EnumString;

use crate::cli::core::{check_required_filename, check_required_folder, AFTER_HELP, FULL_VERSION};

#[derive(Clone, Copy, Default, Debug, Eq, PartialEq, strum_macros::Display, EnumString, Serialize, clap::ValueEnum)]
pub enum PositionMatch {
    /// The report position only needs to occur somewhere in the index key; e.g., "100" will also check "1002"
    #[default]
    #[strum(ascii_case_insensitive, serialize = "substring")]
    #[clap(name = "substring")]
    Substring,
    /// The index key must be the report position, optionally with a multi-allelic suffix; e.g., "100" or "100-2"
    #[strum(ascii_case_insensitive, serialize = "exact")]
    #[clap(name = "exact")]
    Exact,
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct CompareSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    varmatch_version: String,

    /// Folder of single-sample variant call files (VCF), sample names come from the file names
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_folder: PathBuf,

    /// Clinical report (CSV) with "Sample" and "Genomic" columns
    #[clap(required = true)]
    #[clap(short = 'f')]
    #[clap(long = "report")]
    #[clap(value_name = "CSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub report_filename: PathBuf,

    /// Output directory for the comparison results
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// Optional label prepended to the appended result columns; e.g., "MGC" gives "MGC Found"
    #[clap(long = "label")]
    #[clap(value_name = "LABEL")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "")]
    pub label: String,

    /// Controls how report positions are compared to the VCF positions
    #[clap(long = "position-match")]
    #[clap(value_name = "MODE")]
    #[clap(help_heading = Some("Matching parameters"))]
    #[clap(default_value = "substring")]
    pub position_match: PositionMatch,

    /// Number of threads to use for loading VCF files
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_compare_settings(mut settings: CompareSettings) -> anyhow::Result<CompareSettings> {
    // hard code the version in
    settings.varmatch_version = FULL_VERSION.clone();
    info!("Varmatch version: {:?}", &settings.varmatch_version);
    info!("Sub-command: compare");
    info!("Inputs:");

    // check for all the required inputs
    check_required_folder(&settings.input_folder, "VCF folder")?;
    check_required_filename(&settings.report_filename, "Clinical report")?;

    // dump stuff to the logger
    info!("\tVCF folder: {:?}", &settings.input_folder);
    info!("\tClinical report: {:?}", &settings.report_filename);

    // outputs
    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }
    if !settings.label.is_empty() {
        info!("\tColumn label: {:?}", &settings.label);
    }

    info!("Matching parameters:");
    info!("\tPosition match: {}", settings.position_match);

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_position_match_strings() {
        assert_eq!(PositionMatch::from_str("EXACT").unwrap(), PositionMatch::Exact);
        assert_eq!(PositionMatch::from_str("substring").unwrap(), PositionMatch::Substring);
        assert_eq!(PositionMatch::default(), PositionMatch::Substring);
        assert_eq!(PositionMatch::Exact.to_string(), "exact");
    }

    #[test]
    fn test_check_settings() {
        let settings = CompareSettings {
            input_folder: PathBuf::from("test_data/clinical_compare/vcfs"),
            report_filename: PathBuf::from("test_data/clinical_compare/report.csv"),
            output_folder: PathBuf::from("unused"),
            threads: 0,
            ..Default::default()
        };
        let checked = check_compare_settings(settings.clone()).unwrap();
        assert_eq!(checked.threads, 1);
        assert_eq!(checked.varmatch_version, *FULL_VERSION);

        let missing = CompareSettings {
            report_filename: PathBuf::from("test_data/does_not_exist.csv"),
            ..settings
        };
        assert!(check_compare_settings(missing).is_err());
    }
}
