
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct BedSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    varmatch_version: String,

    /// Single-sample variant call file (VCF), the sample name comes from the file name
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub vcf_filename: PathBuf,

    /// Output directory for the BED file
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Appended to the sample name to form the output name, "{sample}{suffix}.bed"
    #[clap(long = "suffix")]
    #[clap(value_name = "SUFFIX")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "_false_positive")]
    pub name_suffix: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_bed_settings(mut settings: BedSettings) -> anyhow::Result<BedSettings> {
    // hard code the version in
    settings.varmatch_version = FULL_VERSION.clone();
    info!("Varmatch version: {:?}", &settings.varmatch_version);
    info!("Sub-command: bed");

    info!("Inputs:");
    check_required_filename(&settings.vcf_filename, "VCF")?;
    info!("\tVCF: {:?}", &settings.vcf_filename);

    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);
    info!("\tName suffix: {:?}", &settings.name_suffix);

    Ok(settings)
}
