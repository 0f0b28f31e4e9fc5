/*!
# Writers module
Contains the logic for writing the output tables of each subcommand.
*/
/// Writes the paired CLC/VCF accuracy table
pub mod accuracy_table;
/// Writes the INDEL, SNP, and ALL precision/recall tables
pub mod accuracy_summary;
/// Writes BED intervals for VCF records
pub mod bed;
/// Writes the flattened per-record depth and frequency table
pub mod extracted_variants;
/// Counts samples per variant position and writes the matrix
pub mod position_matrix;
/// Annotates clinical report rows with their matching VCF record
pub mod reconciliation;
