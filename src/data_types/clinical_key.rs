
use std::fmt;
use std::str::FromStr;

/// Marker separating the chromosome portion from the genomic change
const GENOMIC_PREFIX: &str = "g.";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ClinicalKeyError {
    #[error("descriptor {descriptor:?} is missing the ':' chromosome separator")]
    MissingChromosome { descriptor: String },
    #[error("descriptor {descriptor:?} is missing the \"g.\" genomic prefix")]
    MissingGenomicPrefix { descriptor: String },
    #[error("descriptor {descriptor:?} does not contain a position")]
    MissingPosition { descriptor: String },
    #[error("descriptor {descriptor:?} has a position that does not fit in 64 bits")]
    PositionOverflow { descriptor: String },
    #[error("descriptor {descriptor:?} must contain exactly one '>' between the REF and ALT alleles")]
    MalformedChange { descriptor: String },
}

/// A variant decoded from a clinical `<chrom>:g.<pos><ref>><alt>` descriptor
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ClinicalKey {
    chromosome: String,
    position: u64,
    reference: String,
    alternate: String
}

impl ClinicalKey {
    /// Constructor
    pub fn new(chromosome: String, position: u64, reference: String, alternate: String) -> Self {
        Self {
            chromosome, position, reference, alternate
        }
    }

    /// Decodes a clinical genomic-change descriptor, e.g. "chr7:g.140453136A>T".
    /// The position is the longest contiguous run of ASCII digits after the "g." prefix (first one on ties),
    /// and everything outside that run is the change, which must split on a single '>' into REF and ALT.
    /// # Arguments
    /// * `descriptor` - the raw descriptor from the report
    /// # Errors
    /// * if the chromosome separator or "g." prefix are missing
    /// * if no digits are present, or the digits overflow
    /// * if the change does not have exactly one '>'
    pub fn parse(descriptor: &str) -> Result<Self, ClinicalKeyError> {
        let descriptor = descriptor.trim();
        let (chromosome, remainder) = descriptor.split_once(':')
            .filter(|(chrom, _)| !chrom.is_empty())
            .ok_or_else(|| ClinicalKeyError::MissingChromosome { descriptor: descriptor.to_string() })?;

        let change_start = remainder.find(GENOMIC_PREFIX)
            .ok_or_else(|| ClinicalKeyError::MissingGenomicPrefix { descriptor: descriptor.to_string() })?;
        let position_and_change = &remainder[change_start + GENOMIC_PREFIX.len()..];

        let (run_start, run_end) = longest_digit_run(position_and_change)
            .ok_or_else(|| ClinicalKeyError::MissingPosition { descriptor: descriptor.to_string() })?;
        let position: u64 = position_and_change[run_start..run_end].parse()
            .map_err(|_e| ClinicalKeyError::PositionOverflow { descriptor: descriptor.to_string() })?;

        // the change is whatever surrounds the position run
        let change = format!("{}{}", &position_and_change[..run_start], &position_and_change[run_end..]);
        let (reference, alternate) = change.split_once('>')
            .filter(|(_r, a)| !a.contains('>'))
            .ok_or_else(|| ClinicalKeyError::MalformedChange { descriptor: descriptor.to_string() })?;

        Ok(Self {
            chromosome: chromosome.to_string(),
            position,
            reference: reference.to_string(),
            alternate: alternate.to_string()
        })
    }

    // getters
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }
}

impl fmt::Display for ClinicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{GENOMIC_PREFIX}{}{}>{}", self.chromosome, self.position, self.reference, self.alternate)
    }
}

impl FromStr for ClinicalKey {
    type Err = ClinicalKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Scans for contiguous ASCII digit runs and returns the byte span [start, end) of the longest one.
/// Ties go to the earliest run.
fn longest_digit_run(text: &str) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut run_start: Option<usize> = None;

    for (i, b) in text.bytes().enumerate() {
        match (b.is_ascii_digit(), run_start) {
            // entering a run
            (true, None) => run_start = Some(i),
            // leaving a run
            (false, Some(start)) => {
                best = longer_run(best, (start, i));
                run_start = None;
            },
            _ => {}
        }
    }

    // a run may extend to the end of the text
    if let Some(start) = run_start {
        best = longer_run(best, (start, text.len()));
    }
    best
}

fn longer_run(best: Option<(usize, usize)>, candidate: (usize, usize)) -> Option<(usize, usize)> {
    match best {
        Some((s, e)) if e - s >= candidate.1 - candidate.0 => Some((s, e)),
        _ => Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snv() {
        let key = ClinicalKey::parse("chr7:g.140453136A>T").unwrap();
        assert_eq!(key, ClinicalKey::new("chr7".to_string(), 140453136, "A".to_string(), "T".to_string()));
    }

    #[test]
    fn test_parse_indel() {
        let key = ClinicalKey::parse("chr13:g.32914438GT>G").unwrap();
        assert_eq!(key.chromosome(), "chr13");
        assert_eq!(key.position(), 32914438);
        assert_eq!(key.reference(), "GT");
        assert_eq!(key.alternate(), "G");
    }

    #[test]
    fn test_longest_run_wins() {
        // stray digits elsewhere in the change do not get folded into the position
        let key = ClinicalKey::parse("chr1:g.1A>T2").unwrap();
        assert_eq!(key.position(), 1);
        assert_eq!(key.alternate(), "T2");

        let key = ClinicalKey::parse("chr1:g.12345A>T6").unwrap();
        assert_eq!(key.position(), 12345);
        assert_eq!(key.reference(), "A");
        assert_eq!(key.alternate(), "T6");

        assert_eq!(longest_digit_run("ab12cd3456"), Some((6, 10)));
        assert_eq!(longest_digit_run("12ab34"), Some((0, 2)));
        assert_eq!(longest_digit_run("abc"), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ClinicalKey::parse("chr7g.140453136A>T"),
            Err(ClinicalKeyError::MissingChromosome { descriptor: "chr7g.140453136A>T".to_string() })
        );
        assert!(matches!(ClinicalKey::parse("chr7:140453136A>T"), Err(ClinicalKeyError::MissingGenomicPrefix { .. })));
        assert!(matches!(ClinicalKey::parse("chr7:g.A>T"), Err(ClinicalKeyError::MissingPosition { .. })));
        assert!(matches!(ClinicalKey::parse("chr7:g.140453136AT"), Err(ClinicalKeyError::MalformedChange { .. })));
        assert!(matches!(ClinicalKey::parse("chr7:g.140453136A>T>G"), Err(ClinicalKeyError::MalformedChange { .. })));
        assert!(matches!(ClinicalKey::parse("chr7:g.99999999999999999999A>T"), Err(ClinicalKeyError::PositionOverflow { .. })));
        assert!(matches!(ClinicalKey::parse(":g.1A>T"), Err(ClinicalKeyError::MissingChromosome { .. })));
    }

    #[test]
    fn test_round_trip() {
        let descriptor = "chr17:g.7578406C>T";
        let key: ClinicalKey = descriptor.parse().unwrap();
        assert_eq!(key.to_string(), descriptor);
        assert_eq!(ClinicalKey::parse(&key.to_string()).unwrap(), key);
    }
}
