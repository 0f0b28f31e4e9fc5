
use log::{LevelFilter, error, info, warn};
use std::path::Path;
use std::time::Instant;

use varmatch::accuracy_aggregator::AccuracyAggregator;
use varmatch::cli::accuracy::{AccuracySettings, check_accuracy_settings};
use varmatch::cli::aggregate::{AggregateSettings, check_aggregate_settings};
use varmatch::cli::bed::{BedSettings, check_bed_settings};
use varmatch::cli::compare::{CompareSettings, check_compare_settings};
use varmatch::cli::core::{Commands, get_cli};
use varmatch::cli::extract::{ExtractSettings, check_extract_settings};
use varmatch::cli::positions::{PositionsSettings, check_positions_settings};
use varmatch::cross_reference::MatchConfigBuilder;
use varmatch::data_types::accuracy_bucket::AggregationError;
use varmatch::parsing::accuracy_table::AccuracyTable;
use varmatch::parsing::clinical_report::ClinicalReport;
use varmatch::parsing::sample_index::{IndexError, SampleVariantIndex, SampleVariants};
use varmatch::parsing::vcf_text::VcfError;
use varmatch::util::file_io::{list_input_files, open_text_reader, sample_name_from_path};
use varmatch::util::json_io::save_json;
use varmatch::writers::accuracy_summary::write_accuracy_summaries;
use varmatch::writers::accuracy_table::write_accuracy_table;
use varmatch::writers::bed::{bed_filename, write_bed};
use varmatch::writers::extracted_variants::write_extracted_variants;
use varmatch::writers::position_matrix::PositionMatrix;
use varmatch::writers::reconciliation::{reconcile_report, ReconciliationWriter};

/// Sets up the logger; must run before the settings get checked so those messages show up
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Sets up the number of threads for rayon
fn init_thread_pool(threads: usize) {
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        error!("Error while building thread pool: {e}");
        std::process::exit(exitcode::OSERR);
    }
}

/// Creates an output folder or exits
fn create_folder(folder: &Path, label: &str) {
    info!("Creating {label} folder at {folder:?}...");
    if let Err(e) = std::fs::create_dir_all(folder) {
        error!("Error while creating {label} folder: {e}");
        std::process::exit(exitcode::IOERR);
    }
}

/// Creates the debug folder and saves the CLI options into it
fn save_debug_settings<T: serde::Serialize>(settings: &T, debug_folder: &Path) {
    create_folder(debug_folder, "debug");
    let cli_json = debug_folder.join("cli_settings.json");
    info!("Saving CLI options to {cli_json:?}...");
    if let Err(e) = save_json(settings, &cli_json) {
        error!("Error while saving CLI options: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

/// Input-integrity violations get DATAERR, everything else is treated as an I/O failure
fn loading_exit_code(e: &anyhow::Error) -> i32 {
    if e.downcast_ref::<IndexError>().is_some() ||
        e.downcast_ref::<AggregationError>().is_some() ||
        e.downcast_ref::<VcfError>().is_some() {
        exitcode::DATAERR
    } else {
        exitcode::IOERR
    }
}

/// Loads the VCF folder into the sample index or exits
fn load_sample_index(input_folder: &Path) -> SampleVariantIndex {
    info!("Loading VCF files from {input_folder:?}...");
    match SampleVariantIndex::from_vcf_folder(input_folder) {
        Ok(index) => {
            info!("Loaded {} samples with {} total variants.", index.len(), index.num_records());
            if index.is_empty() {
                warn!("No VCF files were found in {input_folder:?}");
            }
            index
        },
        Err(e) => {
            error!("Error while loading VCF files: {e:#}");
            std::process::exit(loading_exit_code(&e));
        }
    }
}

fn run_compare(settings: CompareSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_compare_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    init_thread_pool(settings.threads);

    create_folder(&settings.output_folder, "output");
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        save_debug_settings(&settings, debug_folder);
    }

    let index = load_sample_index(&settings.input_folder);

    info!("Opening clinical report {:?}...", settings.report_filename);
    let mut report = match ClinicalReport::from_path(&settings.report_filename) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while opening clinical report: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    let out_fn = settings.output_folder.join("compare_results.csv");
    let mut writer = match ReconciliationWriter::new(&out_fn, report.headers(), &settings.label) {
        Ok(w) => w,
        Err(e) => {
            error!("Error while creating {out_fn:?}: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // the builder only fails on missing fields, and every field has a default
    let match_config = MatchConfigBuilder::default()
        .position_match(settings.position_match)
        .build()
        .unwrap_or_default();

    info!("Reconciling report rows, saving results to {out_fn:?}...");
    let counts = match reconcile_report(&mut report, &index, match_config, &mut writer) {
        Ok(c) => c,
        Err(e) => {
            error!("Error while reconciling clinical report: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!("Report rows: {}", counts.total());
    info!("\tFound: {}", counts.found);
    info!("\tNot found: {}", counts.not_found);
    if counts.invalid_descriptor > 0 {
        warn!("\tInvalid descriptor: {}", counts.invalid_descriptor);
    }
    if counts.missing_sample > 0 {
        warn!("\tSample without VCF: {}", counts.missing_sample);
    }

    info!("Compare completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_extract(settings: ExtractSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_extract_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    init_thread_pool(settings.threads);
    create_folder(&settings.output_folder, "output");

    let index = load_sample_index(&settings.input_folder);

    let out_fn = settings.output_folder.join("parsed_vcf_results.csv");
    info!("Saving extracted variants to {out_fn:?}...");
    match write_extracted_variants(&out_fn, &index) {
        Ok(num_rows) => info!("Wrote {num_rows} variant rows."),
        Err(e) => {
            error!("Error while writing extracted variants: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Extract completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_aggregate(settings: AggregateSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_aggregate_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    create_folder(&settings.output_folder, "output");
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        save_debug_settings(&settings, debug_folder);
    }

    let aggregator = match AccuracyAggregator::from_summary_folder(&settings.input_folder) {
        Ok(a) => a,
        Err(e) => {
            error!("Error while loading benchmarking summaries: {e:#}");
            std::process::exit(loading_exit_code(&e));
        }
    };
    info!("Aggregated {} samples.", aggregator.len());

    info!("Saving precision/recall tables to {:?}...", settings.output_folder);
    if let Err(e) = write_accuracy_summaries(&settings.output_folder, &aggregator) {
        error!("Error while writing precision/recall tables: {e}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Aggregate completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_accuracy(settings: AccuracySettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_accuracy_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    create_folder(&settings.output_folder, "output");

    info!("Loading accuracy table from {:?}...", settings.table_filename);
    let mut table = match AccuracyTable::from_tsv(&settings.table_filename) {
        Ok(t) => t,
        Err(e) => {
            error!("Error while loading accuracy table: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Loaded {} CLC calls.", table.len());

    let vcf_files = match list_input_files(&settings.input_folder) {
        Ok(f) => f,
        Err(e) => {
            error!("Error while listing VCF files: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };
    let mut total_updated = 0;
    for vcf_fn in vcf_files.iter() {
        match table.apply_vcf_file(vcf_fn) {
            Ok(updated) => total_updated += updated,
            Err(e) => {
                error!("Error while applying VCF calls: {e:#}");
                std::process::exit(loading_exit_code(&e));
            }
        }
    }
    info!("Paired {total_updated} CLC calls with VCF calls.");

    let out_fn = settings.output_folder.join("parsed_accuracy_results.txt");
    info!("Saving paired accuracy table to {out_fn:?}...");
    if let Err(e) = write_accuracy_table(&out_fn, &table) {
        error!("Error while writing accuracy table: {e}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Accuracy completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_positions(settings: PositionsSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_positions_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    init_thread_pool(settings.threads);
    create_folder(&settings.output_folder, "output");

    let index = load_sample_index(&settings.input_folder);
    let matrix = PositionMatrix::from_index(&index, &settings.exclude_pattern);
    info!("Number of samples analyzed: {}", matrix.samples().len());
    info!("Number of variant positions: {}", matrix.len());

    let out_fn = settings.output_folder.join("variant_positions.csv");
    info!("Saving variant positions to {out_fn:?}...");
    if let Err(e) = matrix.write(&out_fn) {
        error!("Error while writing variant positions: {e}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Positions completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_bed(settings: BedSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_bed_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    create_folder(&settings.output_folder, "output");

    let sample_name = match sample_name_from_path(&settings.vcf_filename) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while naming sample: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    info!("Loading VCF file {:?}...", settings.vcf_filename);
    let sample_variants = match open_text_reader(&settings.vcf_filename)
        .and_then(SampleVariants::from_reader) {
        Ok(sv) => sv,
        Err(e) => {
            error!("Error while loading VCF file: {e:#}");
            std::process::exit(loading_exit_code(&e));
        }
    };

    let out_fn = bed_filename(&settings.output_folder, &sample_name, &settings.name_suffix);
    info!("Saving {} intervals to {out_fn:?}...", sample_variants.len());
    if let Err(e) = write_bed(&out_fn, sample_variants.iter().map(|(_k, r)| r)) {
        error!("Error while writing BED file: {e}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Bed completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Compare(settings) => {
            run_compare(*settings);
        },
        Commands::Extract(settings) => {
            run_extract(*settings);
        },
        Commands::Aggregate(settings) => {
            run_aggregate(*settings);
        },
        Commands::Accuracy(settings) => {
            run_accuracy(*settings);
        },
        Commands::Positions(settings) => {
            run_positions(*settings);
        },
        Commands::Bed(settings) => {
            run_bed(*settings);
        }
    }

    info!("Process finished successfully.");
}
