
use anyhow::{anyhow, Context};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Opens a text file for buffered reading, transparently decompressing .gz files
/// # Arguments
/// * `filename` - the file path to open
/// # Errors
/// * if the file does not open
pub fn open_text_reader(filename: &Path) -> anyhow::Result<Box<dyn BufRead + Send>> {
    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let reader: Box<dyn BufRead + Send> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Lists all regular, non-hidden files in a folder, sorted by file name.
/// # Arguments
/// * `folder` - the folder to scan; sub-folders are ignored
pub fn list_input_files(folder: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut filenames = vec![];
    let entries = std::fs::read_dir(folder)
        .with_context(|| format!("Error while listing {folder:?}:"))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Error while listing {folder:?}:"))?;
        let path = entry.path();
        let is_hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_file() && !is_hidden {
            filenames.push(path);
        }
    }
    filenames.sort();
    Ok(filenames)
}

/// Derives a sample identifier from a file name: everything before the first '.', then before the first '_'.
/// # Examples
/// * `S1_run2.filtered.vcf` => `S1`
/// * `NA12878.summary.csv` => `NA12878`
/// # Errors
/// * if the path has no file name, or the derived identifier is empty
pub fn sample_name_from_path(filename: &Path) -> anyhow::Result<String> {
    let file_name = filename.file_name()
        .ok_or_else(|| anyhow!("Cannot derive a sample name from {filename:?}"))?
        .to_string_lossy();
    let sample_name = file_name.split('.').next().unwrap_or_default()
        .split('_').next().unwrap_or_default();
    if sample_name.is_empty() {
        return Err(anyhow!("Derived an empty sample name from {filename:?}"));
    }
    Ok(sample_name.to_string())
}
