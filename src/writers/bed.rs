
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::data_types::variant_record::VariantRecord;

/// One BED interval covering a record: 0-based start, end extended by the longer of REF and ALT
pub fn record_interval(record: &VariantRecord) -> (u64, u64) {
    let start = record.position().saturating_sub(1);
    let span = record.reference().len().max(record.alternate().len()) as u64;
    (start, start + span)
}

/// The BED path for a sample, "{output_folder}/{sample}{suffix}.bed"
pub fn bed_filename(output_folder: &Path, sample_name: &str, suffix: &str) -> PathBuf {
    output_folder.join(format!("{sample_name}{suffix}.bed"))
}

/// Writes a headerless, tab-delimited BED file with one interval per record
/// # Arguments
/// * `filename` - the output path
/// * `records` - the records to convert, written in the provided order
pub fn write_bed<'a>(filename: &Path, records: impl Iterator<Item = &'a VariantRecord>) -> csv::Result<usize> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(filename)?;

    let mut intervals_written = 0;
    for record in records {
        let (start, end) = record_interval(record);
        csv_writer.write_record([record.chromosome(), &start.to_string(), &end.to_string()])?;
        intervals_written += 1;
    }
    csv_writer.flush()?;
    Ok(intervals_written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: u64, reference: &str, alternate: &str) -> VariantRecord {
        VariantRecord::new("chr1".to_string(), position, reference.to_string(), alternate)
    }

    #[test]
    fn test_record_interval() {
        assert_eq!(record_interval(&record(1000, "A", "T")), (999, 1000));
        assert_eq!(record_interval(&record(1000, "ACG", "A")), (999, 1002));
        assert_eq!(record_interval(&record(1000, "A", "ATTT")), (999, 1003));
    }

    #[test]
    fn test_bed_filename() {
        assert_eq!(bed_filename(Path::new("out"), "S1", "_false_positive"), PathBuf::from("out/S1_false_positive.bed"));
        assert_eq!(bed_filename(Path::new("out"), "S1", ""), PathBuf::from("out/S1.bed"));
    }

    #[test]
    fn test_write_bed() {
        let records = [record(1000, "A", "T"), record(2000, "A", "AT")];
        let out_folder = std::env::temp_dir().join(format!("varmatch_bed_{}", std::process::id()));
        std::fs::create_dir_all(&out_folder).unwrap();
        let out_filename = out_folder.join("S1.bed");

        assert_eq!(write_bed(&out_filename, records.iter()).unwrap(), 2);
        let text = std::fs::read_to_string(&out_filename).unwrap();
        assert_eq!(text, "chr1\t999\t1000\nchr1\t1999\t2001\n");

        std::fs::remove_dir_all(&out_folder).unwrap();
    }
}
