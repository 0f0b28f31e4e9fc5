
use std::ops::AddAssign;

use crate::util::numeric::round_decimal;

/// Number of decimal places kept for precision and recall
pub const METRIC_PLACES: i32 = 7;

/// The variant classes reported by the upstream benchmarking tool
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum_macros::AsRefStr, strum_macros::EnumString, strum_macros::Display)]
pub enum VariantClass {
    #[strum(serialize = "INDEL")]
    Indel,
    #[strum(serialize = "SNP")]
    Snp,
    /// Synthesized from the other classes
    #[strum(serialize = "ALL")]
    All
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AggregationError {
    #[error("{metric} is undefined because TP + {other} = 0")]
    ZeroDenominator { metric: &'static str, other: &'static str },
    #[error("duplicate summary for sample {sample:?}")]
    DuplicateSample { sample: String },
    #[error("sample {sample:?} has more than one {variant_class} row")]
    DuplicateClass { sample: String, variant_class: VariantClass },
}

/// Truth and query counts for one (sample, variant class) pair
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccuracyBucket {
    /// Total number of truth variants
    pub truth_total: u64,
    /// Total number of query variants
    pub query_total: u64,
    /// Number of truth variants found in the query
    pub true_positive: u64,
    /// Number of query variants missing from the truth
    pub false_positive: u64,
    /// Number of truth variants missing from the query
    pub false_negative: u64
}

impl AddAssign for AccuracyBucket {
    // Enables += with stats
    fn add_assign(&mut self, rhs: Self) {
        self.truth_total += rhs.truth_total;
        self.query_total += rhs.query_total;
        self.true_positive += rhs.true_positive;
        self.false_positive += rhs.false_positive;
        self.false_negative += rhs.false_negative;
    }
}

impl AccuracyBucket {
    /// Constructor
    pub fn new(truth_total: u64, query_total: u64, true_positive: u64, false_positive: u64, false_negative: u64) -> Self {
        Self {
            truth_total, query_total, true_positive, false_positive, false_negative
        }
    }

    /// Precision = TP / (TP + FP), rounded to 7 places
    /// # Errors
    /// * if TP + FP is 0
    pub fn precision(&self) -> Result<f64, AggregationError> {
        let denom = self.true_positive + self.false_positive;
        if denom == 0 {
            return Err(AggregationError::ZeroDenominator { metric: "precision", other: "FP" });
        }
        Ok(round_decimal(self.true_positive as f64 / denom as f64, METRIC_PLACES))
    }

    /// Recall = TP / (TP + FN), rounded to 7 places
    /// # Errors
    /// * if TP + FN is 0
    pub fn recall(&self) -> Result<f64, AggregationError> {
        let denom = self.true_positive + self.false_negative;
        if denom == 0 {
            return Err(AggregationError::ZeroDenominator { metric: "recall", other: "FN" });
        }
        Ok(round_decimal(self.true_positive as f64 / denom as f64, METRIC_PLACES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use std::str::FromStr;

    #[test]
    fn test_scores() {
        let bucket = AccuracyBucket::new(20, 14, 12, 2, 8);
        assert_approx_eq!(bucket.precision().unwrap(), 0.8571429);
        assert_approx_eq!(bucket.recall().unwrap(), 0.6);

        // 1/256 is an exact half at the seventh place
        let bucket = AccuracyBucket::new(1, 256, 1, 255, 0);
        assert_eq!(bucket.precision(), Ok(0.0039062));
    }

    #[test]
    fn test_zero_denominator() {
        let bucket = AccuracyBucket::new(0, 0, 0, 0, 0);
        assert_eq!(bucket.precision(), Err(AggregationError::ZeroDenominator { metric: "precision", other: "FP" }));
        assert_eq!(bucket.recall(), Err(AggregationError::ZeroDenominator { metric: "recall", other: "FN" }));

        // only one side can be undefined
        let bucket = AccuracyBucket::new(3, 0, 0, 0, 3);
        assert!(bucket.precision().is_err());
        assert_eq!(bucket.recall(), Ok(0.0));
    }

    #[test]
    fn test_add_assign() {
        let mut bucket = AccuracyBucket::new(10, 9, 8, 1, 2);
        bucket += AccuracyBucket::new(5, 4, 3, 1, 2);
        assert_eq!(bucket, AccuracyBucket::new(15, 13, 11, 2, 4));
    }

    #[test]
    fn test_variant_class_strings() {
        assert_eq!(VariantClass::from_str("INDEL").unwrap(), VariantClass::Indel);
        assert_eq!(VariantClass::from_str("SNP").unwrap(), VariantClass::Snp);
        assert!(VariantClass::from_str("SV").is_err());
        assert_eq!(VariantClass::All.as_ref(), "ALL");
        assert_eq!(VariantClass::Snp.to_string(), "SNP");
    }
}
