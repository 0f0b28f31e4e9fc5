
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_folder, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ExtractSettings {
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

    /// Output directory for the extracted table
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

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

pub fn check_extract_settings(mut settings: ExtractSettings) -> anyhow::Result<ExtractSettings> {
    // hard code the version in
    settings.varmatch_version = FULL_VERSION.clone();
    info!("Varmatch version: {:?}", &settings.varmatch_version);
    info!("Sub-command: extract");

    info!("Inputs:");
    check_required_folder(&settings.input_folder, "VCF folder")?;
    info!("\tVCF folder: {:?}", &settings.input_folder);

    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}
