/// Rolls per-sample benchmarking summaries up into class-level precision and recall
pub mod accuracy_aggregator;
/// Command line interface functionality
pub mod cli;
/// Matches clinical descriptors against the per-sample variant index
pub mod cross_reference;
/// Contains various shared data types
pub mod data_types;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
