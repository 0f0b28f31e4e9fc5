
/// Truth/query counts with precision and recall
pub mod accuracy_bucket;
/// The decoded form of a `chrom:g.<pos><ref>><alt>` descriptor
pub mod clinical_key;
/// A VCF call reduced to position, alleles, depths, and frequencies
pub mod variant_record;
