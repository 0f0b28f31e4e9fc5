/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Loads the CLC accuracy table and pairs it with annotated VCF calls
pub mod accuracy_table;
/// Reader for per-sample benchmarking summaries
pub mod benchmark_summary;
/// Streaming reader for the clinical report
pub mod clinical_report;
/// Loads a folder of VCFs into a per-sample, position-keyed index
pub mod sample_index;
/// Header-driven reader for the VCF text subset
pub mod vcf_text;
