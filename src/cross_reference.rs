
use derive_builder::Builder;
use log::trace;

use crate::cli::compare::PositionMatch;
use crate::data_types::clinical_key::ClinicalKey;
use crate::data_types::variant_record::VariantRecord;
use crate::parsing::sample_index::SampleVariants;

#[derive(Builder, Clone, Copy, Debug, Default)]
#[builder(default)]
pub struct MatchConfig {
    /// Controls how the clinical position is compared to the index position keys
    position_match: PositionMatch
}

/// Outcome of looking up one clinical key in a sample's variants
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult<'a> {
    /// The index key and record that matched, if any
    hit: Option<(&'a str, &'a VariantRecord)>
}

impl<'a> MatchResult<'a> {
    /// A result with no matching record
    pub fn no_match() -> Self {
        Self { hit: None }
    }

    /// A result for a matching record
    pub fn found(sample_key: &'a str, variant: &'a VariantRecord) -> Self {
        Self { hit: Some((sample_key, variant)) }
    }

    pub fn is_match(&self) -> bool {
        self.hit.is_some()
    }

    /// The position key of the matching record in the sample index
    pub fn sample_key(&self) -> Option<&'a str> {
        self.hit.map(|(k, _v)| k)
    }

    pub fn variant(&self) -> Option<&'a VariantRecord> {
        self.hit.map(|(_k, v)| v)
    }
}

/// Checks whether an index position key is a candidate for the given position
/// # Arguments
/// * `position` - the clinical position, as a decimal string
/// * `sample_key` - the index key, either "{pos}" or "{pos}-{n}"
/// * `position_match` - the comparison mode
fn is_position_candidate(position: &str, sample_key: &str, position_match: PositionMatch) -> bool {
    match position_match {
        PositionMatch::Substring => sample_key.contains(position),
        PositionMatch::Exact => {
            match sample_key.strip_prefix(position) {
                Some("") => true,
                Some(suffix) => suffix.strip_prefix('-')
                    .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
                None => false
            }
        }
    }
}

/// Searches a sample's variants for the record described by a clinical key.
/// Keys are visited in insertion order; the first key that passes the position test and has an identical
/// chromosome, REF and ALT is returned. No match is a normal outcome.
/// # Arguments
/// * `clinical_key` - the decoded clinical descriptor
/// * `sample_variants` - the variants for the sample named in the report
/// * `match_config` - controls position matching
pub fn match_clinical_key<'a>(
    clinical_key: &ClinicalKey, sample_variants: &'a SampleVariants, match_config: MatchConfig
) -> MatchResult<'a> {
    let position = clinical_key.position().to_string();
    for (sample_key, variant) in sample_variants.iter() {
        if !is_position_candidate(&position, sample_key, match_config.position_match) {
            continue;
        }

        if variant.chromosome() == clinical_key.chromosome() &&
            variant.reference() == clinical_key.reference() &&
            variant.alternate() == clinical_key.alternate() {
            trace!("Matched {clinical_key} to index key {sample_key}");
            return MatchResult::found(sample_key, variant);
        }
    }
    MatchResult::no_match()
}
