//! One individual's call at a variant.

use crate::common::GenotypeClass;

/// Genotype call of one sample, corresponds to one sample column in VCF.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Genotype {
    pub sample_id: String,
    pub case_id: String,
    /// Raw genotype string, e.g., `"0/1"`.
    pub genotype: String,
    /// Phenotype code of the individual in PED encoding.
    pub phenotype: String,
    pub ref_depth: Option<i32>,
    pub alt_depth: Option<i32>,
    pub genotype_quality: Option<f32>,
    /// Total read coverage at site in the sample.
    pub depth: Option<i32>,
    /// Number of supporting reads for structural variants.
    pub supporting_evidence: i32,
    /// Paired-end support for structural variants.
    pub pe_support: i32,
    /// Split-read support for structural variants.
    pub sr_support: i32,
}

impl Default for Genotype {
    fn default() -> Self {
        Genotype {
            sample_id: Default::default(),
            case_id: Default::default(),
            genotype: String::from("./."),
            phenotype: String::from("0"),
            ref_depth: None,
            alt_depth: None,
            genotype_quality: None,
            depth: None,
            supporting_evidence: 0,
            pe_support: 0,
            sr_support: 0,
        }
    }
}

impl Genotype {
    /// Classification of the raw genotype string.
    pub fn class(&self) -> GenotypeClass {
        GenotypeClass::from_gt(&self.genotype)
    }

    /// Only PED code `"2"` counts as affected.
    pub fn is_affected(&self) -> bool {
        super::case::phenotype_is_affected(&self.phenotype)
    }
}
