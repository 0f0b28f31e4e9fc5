/*!
# CLI module
Command line interface functionality that is specific to Varmatch.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The accuracy-table CLI subcommand
pub mod accuracy;
/// The summary aggregation CLI subcommand
pub mod aggregate;
/// The VCF to BED CLI subcommand
pub mod bed;
/// The clinical compare CLI subcommand
pub mod compare;
/// The record extraction CLI subcommand
pub mod extract;
/// The recurrent position CLI subcommand
pub mod positions;
