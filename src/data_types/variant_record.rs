
use log::trace;

use crate::data_types::clinical_key::ClinicalKey;
use crate::util::numeric::round_decimal;

/// Number of decimal places kept for the depth-derived allele frequency
pub const ALLELE_FREQUENCY_PLACES: i32 = 4;

/// A single VCF call reduced to the fields needed for cross-referencing.
/// Depth and frequency fields are `None` when the genotype column did not provide usable values.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantRecord {
    /// Chromosome, as written in the VCF
    chromosome: String,
    /// The 1-based POS value
    position: u64,
    /// REF allele, as written
    reference: String,
    /// ALT allele(s), with multiple alleles joined by ':' instead of ','
    alternate: String,
    /// Depth of the first ALT allele from AD
    alt_depth: Option<u64>,
    /// Sum of the REF and first ALT depth from AD
    total_depth: Option<u64>,
    /// The AF value reported by the caller, ',' rewritten to ':'
    called_allele_frequency: Option<String>,
    /// alt_depth / total_depth, rounded to 4 places
    real_allele_frequency: Option<f64>
}

impl VariantRecord {
    /// Constructor, all depth and frequency fields start as not available.
    /// # Arguments
    /// * `chromosome` - the contig name
    /// * `position` - the VCF coordinate (1-based)
    /// * `reference` - the REF allele
    /// * `alternate` - the raw ALT column; ',' separators get rewritten to ':'
    pub fn new(chromosome: String, position: u64, reference: String, alternate: &str) -> Self {
        Self {
            chromosome,
            position,
            reference,
            alternate: alternate.replace(',', ":"),
            alt_depth: None,
            total_depth: None,
            called_allele_frequency: None,
            real_allele_frequency: None
        }
    }

    /// Fills in the depth fields from a raw AD value, e.g. "50,30".
    /// Anything that is not at least two unsigned integers leaves the depths as not available.
    /// # Arguments
    /// * `allele_depth` - the raw AD sub-field, if the FORMAT declared one
    pub fn with_allele_depth(mut self, allele_depth: Option<&str>) -> Self {
        match allele_depth.and_then(parse_allele_depth) {
            Some((ref_depth, alt_depth)) => {
                let total_depth = ref_depth + alt_depth;
                self.alt_depth = Some(alt_depth);
                self.total_depth = Some(total_depth);
                self.real_allele_frequency = if total_depth > 0 {
                    Some(round_decimal(alt_depth as f64 / total_depth as f64, ALLELE_FREQUENCY_PLACES))
                } else {
                    None
                };
            },
            None => {
                trace!("Unusable AD value {allele_depth:?} at {}:{}", self.chromosome, self.position);
                self.alt_depth = None;
                self.total_depth = None;
                self.real_allele_frequency = None;
            }
        }
        self
    }

    /// Copies the caller-reported AF value, rewriting multi-allelic ',' separators to ':'
    /// # Arguments
    /// * `allele_frequency` - the raw AF sub-field, if the FORMAT declared one
    pub fn with_called_frequency(mut self, allele_frequency: Option<&str>) -> Self {
        self.called_allele_frequency = allele_frequency.map(|af| af.replace(',', ":"));
        self
    }

    /// Recomposes the record into the `chrom:g.<pos><ref>><alt>` notation used by clinical reports
    pub fn genomic_descriptor(&self) -> String {
        self.to_clinical_key().to_string()
    }

    /// Converts this record into the equivalent clinical key
    pub fn to_clinical_key(&self) -> ClinicalKey {
        ClinicalKey::new(
            self.chromosome.clone(), self.position,
            self.reference.clone(), self.alternate.clone()
        )
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

    pub fn alt_depth(&self) -> Option<u64> {
        self.alt_depth
    }

    pub fn total_depth(&self) -> Option<u64> {
        self.total_depth
    }

    pub fn called_allele_frequency(&self) -> Option<&str> {
        self.called_allele_frequency.as_deref()
    }

    pub fn real_allele_frequency(&self) -> Option<f64> {
        self.real_allele_frequency
    }
}

/// Parses the first two comma-separated values of an AD field into (ref depth, alt depth)
fn parse_allele_depth(raw: &str) -> Option<(u64, u64)> {
    let mut values = raw.split(',');
    let ref_depth = values.next()?.trim().parse::<u64>().ok()?;
    let alt_depth = values.next()?.trim().parse::<u64>().ok()?;
    Some((ref_depth, alt_depth))
}
