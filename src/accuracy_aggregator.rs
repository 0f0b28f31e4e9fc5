
use anyhow::Context;
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::data_types::accuracy_bucket::{AccuracyBucket, AggregationError, VariantClass, METRIC_PLACES};
use crate::parsing::benchmark_summary::{load_benchmark_summary, BenchmarkRow};
use crate::util::file_io::{list_input_files, sample_name_from_path};
use crate::util::numeric::round_decimal;

/// The classes that get summed into the ALL bucket
pub const COMPONENT_CLASSES: [VariantClass; 2] = [VariantClass::Indel, VariantClass::Snp];

/// Counts and metrics for a single (sample, class) pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassSummary {
    /// The raw counts
    bucket: AccuracyBucket,
    /// Precision reported upstream, rounded to 7 places; the ALL class never has one
    reported_precision: Option<f64>,
    /// Recall reported upstream, rounded to 7 places; the ALL class never has one
    reported_recall: Option<f64>
}

impl ClassSummary {
    /// Creates a summary that keeps the upstream-reported metrics
    pub fn from_row(row: &BenchmarkRow) -> Self {
        Self {
            bucket: row.bucket(),
            reported_precision: row.precision.map(|p| round_decimal(p, METRIC_PLACES)),
            reported_recall: row.recall.map(|r| round_decimal(r, METRIC_PLACES))
        }
    }

    /// Creates a summary where metrics are always computed from the counts
    pub fn from_bucket(bucket: AccuracyBucket) -> Self {
        Self {
            bucket,
            reported_precision: None,
            reported_recall: None
        }
    }

    /// The reported precision if there is one, otherwise computed from the counts
    pub fn precision(&self) -> Result<f64, AggregationError> {
        match self.reported_precision {
            Some(p) => Ok(p),
            None => self.bucket.precision()
        }
    }

    /// The reported recall if there is one, otherwise computed from the counts
    pub fn recall(&self) -> Result<f64, AggregationError> {
        match self.reported_recall {
            Some(r) => Ok(r),
            None => self.bucket.recall()
        }
    }

    pub fn bucket(&self) -> &AccuracyBucket {
        &self.bucket
    }
}

/// All class-level summaries for one sample
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleAccuracy {
    /// Summaries for the component classes
    classes: BTreeMap<VariantClass, ClassSummary>
}

impl SampleAccuracy {
    /// Builds the per-class summaries from one sample's rows.
    /// Rows filtered to PASS are dropped entirely, as are rows with a class we do not aggregate.
    /// # Arguments
    /// * `sample_name` - used for error and log messages
    /// * `rows` - every row from the sample's summary
    /// # Errors
    /// * if a class appears more than once after filtering
    pub fn from_rows(sample_name: &str, rows: &[BenchmarkRow]) -> Result<Self, AggregationError> {
        let mut classes: BTreeMap<VariantClass, ClassSummary> = Default::default();
        for row in rows.iter() {
            if row.is_pass_filtered() {
                continue;
            }

            let variant_class = match VariantClass::from_str(&row.variant_type) {
                Ok(vc) if COMPONENT_CLASSES.contains(&vc) => vc,
                _ => {
                    warn!("Ignoring unsupported variant type {:?} for sample {sample_name}", row.variant_type);
                    continue;
                }
            };

            if classes.insert(variant_class, ClassSummary::from_row(row)).is_some() {
                return Err(AggregationError::DuplicateClass {
                    sample: sample_name.to_string(), variant_class
                });
            }
        }
        Ok(Self { classes })
    }

    /// Sum of all component class counts
    pub fn all_bucket(&self) -> AccuracyBucket {
        let mut total = AccuracyBucket::default();
        for summary in self.classes.values() {
            total += summary.bucket;
        }
        total
    }

    /// Returns the summary for a class; ALL is synthesized from the component classes, with metrics recomputed from the summed counts.
    /// Returns None if the class was not in the input (or, for ALL, if no class was).
    pub fn summary(&self, variant_class: VariantClass) -> Option<ClassSummary> {
        match variant_class {
            VariantClass::All => {
                if self.classes.is_empty() {
                    None
                } else {
                    Some(ClassSummary::from_bucket(self.all_bucket()))
                }
            },
            vc => self.classes.get(&vc).copied()
        }
    }
}

/// Collects the per-sample accuracy summaries
#[derive(Debug, Default)]
pub struct AccuracyAggregator {
    /// Sample name to summaries, in the order they were added
    samples: IndexMap<String, SampleAccuracy>
}

impl AccuracyAggregator {
    /// Loads every file in a folder as a per-sample benchmarking summary.
    /// Sample names are derived from the file names.
    /// # Arguments
    /// * `folder` - folder of summary CSV files
    /// # Errors
    /// * if a summary fails to load
    /// * if two files map to the same sample, or a class repeats within a file
    pub fn from_summary_folder(folder: &Path) -> anyhow::Result<Self> {
        let filenames = list_input_files(folder)?;
        info!("Loading {} benchmarking summaries...", filenames.len());

        let mut aggregator = Self::default();
        for filename in filenames.iter() {
            let sample_name = sample_name_from_path(filename)?;
            let rows = load_benchmark_summary(filename)?;
            aggregator.add_sample(&sample_name, &rows)
                .with_context(|| format!("Error while aggregating {filename:?}:"))?;
        }
        Ok(aggregator)
    }

    /// Adds a sample from its summary rows
    /// # Arguments
    /// * `sample_name` - the unique sample identifier
    /// * `rows` - all rows from that sample's summary
    /// # Errors
    /// * if the sample was already added
    /// * if a class is repeated within the rows
    pub fn add_sample(&mut self, sample_name: &str, rows: &[BenchmarkRow]) -> Result<(), AggregationError> {
        if self.samples.contains_key(sample_name) {
            return Err(AggregationError::DuplicateSample { sample: sample_name.to_string() });
        }
        let sample_accuracy = SampleAccuracy::from_rows(sample_name, rows)?;
        debug!("Aggregated sample {sample_name}: {:?}", sample_accuracy.all_bucket());
        self.samples.insert(sample_name.to_string(), sample_accuracy);
        Ok(())
    }

    pub fn get(&self, sample_name: &str) -> Option<&SampleAccuracy> {
        self.samples.get(sample_name)
    }

    /// Iterates over (sample, summaries) in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleAccuracy)> {
        self.samples.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
