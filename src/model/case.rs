//! Cases and the individuals sequenced in them.

use std::path::PathBuf;

/// Kind of variants found in a variant source.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Clone,
    Copy,
    Default,
    clap::ValueEnum,
    strum::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VariantType {
    /// Single nucleotide variants and small indels.
    #[default]
    Snv,
    /// Structural variants.
    Sv,
}

/// Backend a case is served from.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Clone,
    Copy,
    Default,
    strum::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VariantMode {
    /// Flat variant call files.
    #[default]
    Vcf,
    /// GEMINI-style query database.
    Gemini,
}

/// PED phenotype code `"2"` is affected, everything else is not.
pub(crate) fn phenotype_is_affected(phenotype: &str) -> bool {
    matches!(phenotype, "2")
}

/// One sequenced sample with its pedigree information.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Individual {
    pub ind_id: String,
    pub case_id: String,
    /// Mother id, `"0"` if unknown.
    pub mother: String,
    /// Father id, `"0"` if unknown.
    pub father: String,
    /// Sex in PED encoding.
    pub sex: String,
    /// Phenotype in PED encoding.
    pub phenotype: String,
    /// Column or array slot of this individual in the variant source.
    pub ind_index: usize,
    pub variant_source: PathBuf,
    pub bam_path: Option<PathBuf>,
}

impl Individual {
    /// Individual without pedigree information.
    pub fn new(ind_id: &str, case_id: &str, ind_index: usize, variant_source: PathBuf) -> Self {
        Individual {
            ind_id: ind_id.to_string(),
            case_id: case_id.to_string(),
            mother: String::from("0"),
            father: String::from("0"),
            sex: String::from("0"),
            phenotype: String::from("0"),
            ind_index,
            variant_source,
            bam_path: None,
        }
    }

    pub fn sex_human(&self) -> &'static str {
        match self.sex.as_str() {
            "1" => "male",
            "2" => "female",
            _ => "unknown",
        }
    }

    pub fn is_male(&self) -> bool {
        self.sex == "1"
    }

    /// Only phenotype code `"2"` is affected; `"1"` and unknown codes are
    /// both reported as unaffected.
    pub fn is_affected(&self) -> bool {
        phenotype_is_affected(&self.phenotype)
    }

    pub fn has_mother(&self) -> bool {
        !self.mother.is_empty() && self.mother != "0"
    }

    pub fn has_father(&self) -> bool {
        !self.father.is_empty() && self.father != "0"
    }
}

/// A family or cohort analysed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Case {
    /// Stable id used to request variants.
    pub case_id: String,
    pub name: String,
    pub variant_source: PathBuf,
    pub variant_type: VariantType,
    pub variant_mode: VariantMode,
    pub compressed: bool,
    pub tabix_index: bool,
    /// Individuals in source column order.
    pub individuals: Vec<Individual>,
}

impl Case {
    pub fn new(
        case_id: &str,
        variant_source: PathBuf,
        variant_type: VariantType,
        variant_mode: VariantMode,
    ) -> Self {
        Case {
            case_id: case_id.to_string(),
            name: case_id.to_string(),
            variant_source,
            variant_type,
            variant_mode,
            ..Default::default()
        }
    }

    pub fn add_individual(&mut self, individual: Individual) {
        tracing::info!(
            "Adding ind {} to case {}",
            &individual.ind_id,
            &self.case_id
        );
        self.individuals.push(individual);
    }

    pub fn individual(&self, ind_id: &str) -> Option<&Individual> {
        self.individuals.iter().find(|ind| ind.ind_id == ind_id)
    }

    pub fn affected(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter().filter(|ind| ind.is_affected())
    }

    pub fn unaffected(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter().filter(|ind| !ind.is_affected())
    }
}
