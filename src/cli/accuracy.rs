
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, check_required_folder, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct AccuracySettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    varmatch_version: String,

    /// Folder of annotated variant call files (VCF) with CAVA_GENE and CAVA_CSN in INFO
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_folder: PathBuf,

    /// CLC accuracy table (TSV) with a header line
    #[clap(required = true)]
    #[clap(short = 'f')]
    #[clap(long = "accuracy-table")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub table_filename: PathBuf,

    /// Output directory for the paired results
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_accuracy_settings(mut settings: AccuracySettings) -> anyhow::Result<AccuracySettings> {
    // hard code the version in
    settings.varmatch_version = FULL_VERSION.clone();
    info!("Varmatch version: {:?}", &settings.varmatch_version);
    info!("Sub-command: accuracy");

    info!("Inputs:");
    check_required_folder(&settings.input_folder, "VCF folder")?;
    check_required_filename(&settings.table_filename, "Accuracy table")?;
    info!("\tVCF folder: {:?}", &settings.input_folder);
    info!("\tAccuracy table: {:?}", &settings.table_filename);

    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);

    Ok(settings)
}
