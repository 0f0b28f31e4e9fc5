/*!
# Utility module
Small shared helpers that are not tied to a single subcommand.
*/
/// Input file discovery, gzip-aware readers, and sample naming
pub mod file_io;
/// Writes settings to JSON for debugging
pub mod json_io;
/// Rounding and NA formatting for output tables
pub mod numeric;
/// Shared progress bar style
pub mod progress_bar;
