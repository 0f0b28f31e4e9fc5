
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_folder, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct AggregateSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    varmatch_version: String,

    /// Folder of per-sample benchmarking summaries (*.summary.csv), sample names come from the file names
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_folder: PathBuf,

    /// Output directory for the INDEL, SNP, and ALL tables
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

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_aggregate_settings(mut settings: AggregateSettings) -> anyhow::Result<AggregateSettings> {
    // hard code the version in
    settings.varmatch_version = FULL_VERSION.clone();
    info!("Varmatch version: {:?}", &settings.varmatch_version);
    info!("Sub-command: aggregate");

    info!("Inputs:");
    check_required_folder(&settings.input_folder, "Summary folder")?;
    info!("\tSummary folder: {:?}", &settings.input_folder);

    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }

    Ok(settings)
}
