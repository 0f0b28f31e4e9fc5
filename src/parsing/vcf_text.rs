
use anyhow::Context;
use rustc_hash::FxHashMap;
use std::io::BufRead;

use crate::data_types::variant_record::VariantRecord;

/// Prefix of the column header line
pub const HEADER_PREFIX: &str = "#CHROM";
/// FORMAT key holding the allele depths
pub const FORMAT_ALLELE_DEPTH: &str = "AD";
/// FORMAT key holding the caller-reported allele frequency
pub const FORMAT_ALLELE_FREQUENCY: &str = "AF";

/// The columns that must be present in the header line
const REQUIRED_COLUMNS: [&str; 5] = [HEADER_PREFIX, "POS", "REF", "ALT", "FORMAT"];

/// Column layout that gets used when a file has no header line
const STANDARD_COLUMNS: [&str; 10] = [HEADER_PREFIX, "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT", "SAMPLE"];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VcfError {
    #[error("header is missing required column {column}")]
    MissingColumn { column: String },
    #[error("line {line_number}: data line found before the #CHROM header")]
    MissingHeader { line_number: usize },
    #[error("line {line_number}: expected at least {expected} tab-delimited fields, found {found}")]
    TruncatedLine { line_number: usize, expected: usize, found: usize },
    #[error("line {line_number}: POS value {value:?} is not a valid position")]
    InvalidPosition { line_number: usize, value: String },
}

/// Column indices resolved once from a `#CHROM` header line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VcfHeader {
    chrom: usize,
    pos: usize,
    reference: usize,
    alternate: usize,
    format: usize,
    /// INFO is only needed by some callers, so it is optional
    info: Option<usize>,
    /// Number of columns declared, data lines must have at least this many fields
    num_columns: usize
}

/// Indices of the FORMAT sub-fields we care about for a specific FORMAT string
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatLayout {
    allele_depth: Option<usize>,
    allele_frequency: Option<usize>
}

impl FormatLayout {
    /// Resolves the AD and AF positions from a FORMAT value, e.g. "GT:AD:AF"
    pub fn from_format(format: &str) -> Self {
        let mut layout = Self::default();
        for (i, key) in format.split(':').enumerate() {
            // first occurrence wins
            if key == FORMAT_ALLELE_DEPTH && layout.allele_depth.is_none() {
                layout.allele_depth = Some(i);
            } else if key == FORMAT_ALLELE_FREQUENCY && layout.allele_frequency.is_none() {
                layout.allele_frequency = Some(i);
            }
        }
        layout
    }
}

impl VcfHeader {
    /// Resolves column indices from the `#CHROM` line.
    /// # Arguments
    /// * `header_line` - the full tab-delimited header line
    /// # Errors
    /// * if any required column is missing
    pub fn from_header_line(header_line: &str) -> Result<Self, VcfError> {
        let columns: Vec<&str> = header_line.trim_end_matches(['\r', '\n']).split('\t').collect();
        Self::from_columns(&columns)
    }

    /// Layout for files that lack a header line, assumes the standard single-sample VCF column order
    pub fn standard() -> Self {
        // this cannot fail, all required columns are in the standard layout
        Self {
            chrom: 0,
            pos: 1,
            reference: 3,
            alternate: 4,
            format: 8,
            info: Some(7),
            num_columns: STANDARD_COLUMNS.len()
        }
    }

    fn from_columns(columns: &[&str]) -> Result<Self, VcfError> {
        let lookup: FxHashMap<&str, usize> = columns.iter().enumerate()
            .rev() // so the first occurrence of a name is the one that sticks
            .map(|(i, &c)| (c, i))
            .collect();
        let find = |name: &str| -> Result<usize, VcfError> {
            lookup.get(name).copied()
                .ok_or_else(|| VcfError::MissingColumn { column: name.to_string() })
        };

        // check them all in order so error messages are stable
        let indices = REQUIRED_COLUMNS.iter()
            .map(|&name| find(name))
            .collect::<Result<Vec<usize>, VcfError>>()?;

        // the sample column is always the final one, and it can't be one of the fixed columns
        let num_columns = columns.len();
        if indices.contains(&(num_columns - 1)) {
            return Err(VcfError::MissingColumn { column: "SAMPLE".to_string() });
        }

        Ok(Self {
            chrom: indices[0],
            pos: indices[1],
            reference: indices[2],
            alternate: indices[3],
            format: indices[4],
            info: lookup.get("INFO").copied(),
            num_columns
        })
    }

    /// Splits a data line into fields, checking it has all the columns of the header
    /// # Arguments
    /// * `line` - the raw data line
    /// * `line_number` - 1-based line number for error reporting
    pub fn split_fields<'a>(&self, line: &'a str, line_number: usize) -> Result<Vec<&'a str>, VcfError> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < self.num_columns {
            return Err(VcfError::TruncatedLine {
                line_number, expected: self.num_columns, found: fields.len()
            });
        }
        Ok(fields)
    }

    /// Returns the INFO field for a split data line, if the header declared one
    pub fn info_field<'a>(&self, fields: &[&'a str]) -> Option<&'a str> {
        self.info.and_then(|i| fields.get(i).copied())
    }

    /// Builds a VariantRecord from already split fields.
    /// # Arguments
    /// * `fields` - output from `split_fields(...)`
    /// * `line_number` - 1-based line number for error reporting
    /// * `format_cache` - cache of FORMAT layouts, shared for the whole file
    /// # Errors
    /// * if the POS column is not an unsigned integer
    pub fn extract_from_fields(&self, fields: &[&str], line_number: usize, format_cache: &mut FormatCache) -> Result<VariantRecord, VcfError> {
        let raw_position = fields[self.pos];
        let position: u64 = raw_position.parse()
            .map_err(|_e| VcfError::InvalidPosition { line_number, value: raw_position.to_string() })?;

        // the genotype values always come from the final column
        let layout = format_cache.layout(fields[self.format]);
        let sample_values: Vec<&str> = fields[fields.len() - 1].split(':').collect();
        let allele_depth = layout.allele_depth.and_then(|i| sample_values.get(i).copied());
        let allele_frequency = layout.allele_frequency.and_then(|i| sample_values.get(i).copied());

        let record = VariantRecord::new(
            fields[self.chrom].to_string(), position,
            fields[self.reference].to_string(), fields[self.alternate]
        )
            .with_allele_depth(allele_depth)
            .with_called_frequency(allele_frequency);
        Ok(record)
    }

    /// Convenience wrapper that splits and extracts a single data line
    /// # Arguments
    /// * `line` - the raw data line
    /// * `line_number` - 1-based line number for error reporting
    /// * `format_cache` - cache of FORMAT layouts, shared for the whole file
    pub fn extract_record(&self, line: &str, line_number: usize, format_cache: &mut FormatCache) -> Result<VariantRecord, VcfError> {
        let fields = self.split_fields(line, line_number)?;
        self.extract_from_fields(&fields, line_number, format_cache)
    }
}

/// Caches FORMAT layouts since most files only use a handful of distinct FORMAT strings
#[derive(Debug, Default)]
pub struct FormatCache {
    layouts: FxHashMap<String, FormatLayout>
}

impl FormatCache {
    /// Returns the layout for a FORMAT string, resolving it on first use
    pub fn layout(&mut self, format: &str) -> FormatLayout {
        if let Some(&layout) = self.layouts.get(format) {
            return layout;
        }
        let layout = FormatLayout::from_format(format);
        self.layouts.insert(format.to_string(), layout);
        layout
    }

    /// Number of distinct FORMAT strings seen
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

/// Classification of a raw line in a VCF text file
#[derive(Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Meta lines (##) and blank lines
    Skip,
    /// The `#CHROM` column header
    Header(&'a str),
    /// A variant line
    Data(&'a str)
}

/// Classifies a raw VCF line
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.starts_with(HEADER_PREFIX) {
        LineKind::Header(trimmed)
    } else if trimmed.is_empty() || trimmed.starts_with('#') {
        LineKind::Skip
    } else {
        LineKind::Data(trimmed)
    }
}

/// A successfully parsed data line
#[derive(Clone, Debug, PartialEq)]
pub struct VcfLine {
    /// 1-based line number in the source
    pub line_number: usize,
    /// The extracted record
    pub record: VariantRecord,
    /// The raw INFO column, when the layout has one
    pub info: Option<String>
}

/// Iterates over the data lines of a VCF text stream, resolving the header layout once.
pub struct VcfTextReader<R: BufRead> {
    /// Source of lines
    reader: R,
    /// Resolved layout, set once the header line is read
    header: Option<VcfHeader>,
    /// If true, data lines before a header use the standard column layout
    allow_headerless: bool,
    /// FORMAT layouts seen in this stream
    format_cache: FormatCache,
    /// Number of lines consumed so far
    line_number: usize,
    /// Re-usable line buffer
    buffer: String,
    /// Set after the first error or EOF
    finished: bool
}

impl<R: BufRead> VcfTextReader<R> {
    /// Creates a reader that requires a `#CHROM` header before any data line
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            header: None,
            allow_headerless: false,
            format_cache: FormatCache::default(),
            line_number: 0,
            buffer: String::new(),
            finished: false
        }
    }

    /// Creates a reader that falls back to the standard column layout when no header is present
    pub fn headerless(reader: R) -> Self {
        let mut vcf_reader = Self::new(reader);
        vcf_reader.allow_headerless = true;
        vcf_reader
    }

    /// Number of distinct FORMAT layouts encountered so far
    pub fn num_format_layouts(&self) -> usize {
        self.format_cache.len()
    }

    fn read_next(&mut self) -> anyhow::Result<Option<VcfLine>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)
                .with_context(|| format!("Error while reading line {}", self.line_number + 1))?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let line_number = self.line_number;

            match classify_line(&self.buffer) {
                LineKind::Skip => {},
                LineKind::Header(header_line) => {
                    self.header = Some(VcfHeader::from_header_line(header_line)?);
                },
                LineKind::Data(data_line) => {
                    if self.header.is_none() && self.allow_headerless {
                        self.header = Some(VcfHeader::standard());
                    }
                    let Some(header) = self.header.as_ref() else {
                        return Err(VcfError::MissingHeader { line_number }.into());
                    };
                    let fields = header.split_fields(data_line, line_number)?;
                    let record = header.extract_from_fields(&fields, line_number, &mut self.format_cache)?;
                    let info = header.info_field(&fields).map(|s| s.to_string());
                    return Ok(Some(VcfLine { line_number, record, info }));
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for VcfTextReader<R> {
    type Item = anyhow::Result<VcfLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_next() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.finished = true;
                None
            },
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    const HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1";

    #[test]
    fn test_extract_scenario() {
        let header = VcfHeader::from_header_line(HEADER).unwrap();
        let mut cache = FormatCache::default();
        let record = header.extract_record("chr7\t140453136\t.\tA\tT\t.\t.\t.\tAD:AF\t50,30:0.375", 2, &mut cache).unwrap();
        assert_eq!(record.chromosome(), "chr7");
        assert_eq!(record.position(), 140453136);
        assert_eq!(record.reference(), "A");
        assert_eq!(record.alternate(), "T");
        assert_eq!(record.alt_depth(), Some(30));
        assert_eq!(record.total_depth(), Some(80));
        assert_eq!(record.called_allele_frequency(), Some("0.375"));
        assert_approx_eq!(record.real_allele_frequency().unwrap(), 0.375);
    }

    #[test]
    fn test_reordered_columns() {
        let header = VcfHeader::from_header_line("POS\tREF\t#CHROM\tALT\tFORMAT\tS1").unwrap();
        let mut cache = FormatCache::default();
        let record = header.extract_record("1000\tG\tchr2\tC,A\tGT:AF:AD\t0/1:0.1,0.2:10,5,2", 1, &mut cache).unwrap();
        assert_eq!(record.chromosome(), "chr2");
        assert_eq!(record.position(), 1000);
        assert_eq!(record.reference(), "G");
        assert_eq!(record.alternate(), "C:A");
        assert_eq!(record.total_depth(), Some(15));
        assert_eq!(record.called_allele_frequency(), Some("0.1:0.2"));
    }

    #[test]
    fn test_format_varies_per_line() {
        let header = VcfHeader::from_header_line(HEADER).unwrap();
        let mut cache = FormatCache::default();
        let r1 = header.extract_record("chr1\t10\t.\tA\tT\t.\t.\t.\tGT:AD\t0/1:6,4", 1, &mut cache).unwrap();
        let r2 = header.extract_record("chr1\t20\t.\tA\tT\t.\t.\t.\tAD:GT\t1,9:0/1", 2, &mut cache).unwrap();
        let r3 = header.extract_record("chr1\t30\t.\tA\tT\t.\t.\t.\tGT\t0/1", 3, &mut cache).unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(r1.alt_depth(), Some(4));
        assert_eq!(r2.alt_depth(), Some(9));
        assert_eq!(r3.alt_depth(), None);
        assert_eq!(r3.called_allele_frequency(), None);
    }

    #[test]
    fn test_short_sample_column() {
        // FORMAT declares AD but the sample column got truncated
        let header = VcfHeader::from_header_line(HEADER).unwrap();
        let mut cache = FormatCache::default();
        let record = header.extract_record("chr1\t10\t.\tA\tT\t.\t.\t.\tGT:AD\t0/1", 1, &mut cache).unwrap();
        assert_eq!(record.total_depth(), None);
    }

    #[test]
    fn test_missing_columns() {
        assert_eq!(
            VcfHeader::from_header_line("#CHROM\tPOS\tREF\tFORMAT\tS1"),
            Err(VcfError::MissingColumn { column: "ALT".to_string() })
        );
        assert_eq!(
            VcfHeader::from_header_line("#CHROM\tPOS\tREF\tALT\tFORMAT"),
            Err(VcfError::MissingColumn { column: "SAMPLE".to_string() })
        );
    }

    #[test]
    fn test_structural_line_errors() {
        let header = VcfHeader::from_header_line(HEADER).unwrap();
        let mut cache = FormatCache::default();
        assert_eq!(
            header.extract_record("chr1\t10\t.\tA\tT", 5, &mut cache),
            Err(VcfError::TruncatedLine { line_number: 5, expected: 10, found: 5 })
        );
        assert_eq!(
            header.extract_record("chr1\tten\t.\tA\tT\t.\t.\t.\tGT\t0/1", 6, &mut cache),
            Err(VcfError::InvalidPosition { line_number: 6, value: "ten".to_string() })
        );
    }

    #[test]
    fn test_standard_layout() {
        let header = VcfHeader::standard();
        let line = "chr3\t178936091\t.\tG\tA\t.\tPASS\tCAVA_GENE=PIK3CA;CAVA_CSN=c.1633G>A_p.E545K\tGT:AD\t0/1:70,30";
        let fields = header.split_fields(line, 1).unwrap();
        assert_eq!(header.info_field(&fields), Some("CAVA_GENE=PIK3CA;CAVA_CSN=c.1633G>A_p.E545K"));
        let mut cache = FormatCache::default();
        let record = header.extract_from_fields(&fields, 1, &mut cache).unwrap();
        assert_eq!(record.total_depth(), Some(100));
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("##fileformat=VCFv4.2\n"), LineKind::Skip);
        assert_eq!(classify_line("\n"), LineKind::Skip);
        assert_eq!(classify_line("#CHROM\tPOS\n"), LineKind::Header("#CHROM\tPOS"));
        assert_eq!(classify_line("chr1\t10\r\n"), LineKind::Data("chr1\t10"));
    }

    #[test]
    fn test_text_reader() {
        let text = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n\
            chr1\t100\t.\tA\tG\t.\t.\tDP=5\tGT:AD\t0/1:3,2\n\
            \n\
            chr1\t200\t.\tC\tT,G\t.\t.\t.\tGT:AD\t1/2:0,4,4\n";
        let lines: Vec<VcfLine> = VcfTextReader::new(text.as_bytes())
            .collect::<anyhow::Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 3);
        assert_eq!(lines[0].info.as_deref(), Some("DP=5"));
        assert_eq!(lines[1].line_number, 5);
        assert_eq!(lines[1].record.alternate(), "T:G");
    }

    #[test]
    fn test_text_reader_requires_header() {
        let text = "chr1\t100\t.\tA\tG\t.\t.\t.\tGT:AD\t0/1:3,2\n";
        let mut reader = VcfTextReader::new(text.as_bytes());
        let error = reader.next().unwrap().unwrap_err();
        assert_eq!(error.downcast_ref::<VcfError>(), Some(&VcfError::MissingHeader { line_number: 1 }));
        assert!(reader.next().is_none());

        // the headerless variant falls back to the standard columns
        let lines: Vec<VcfLine> = VcfTextReader::headerless(text.as_bytes())
            .collect::<anyhow::Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].record.total_depth(), Some(5));
    }
}
