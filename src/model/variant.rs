//! The canonical variant record.

use super::{Gene, Genotype, Transcript};

/// Coarse impact bucket of the most severe consequence.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Clone,
    Copy,
    strum::Display,
    strum_macros::EnumString,
    strum::EnumIter,
)]
pub enum ImpactSeverity {
    #[serde(rename = "LOW")]
    #[strum(serialize = "LOW")]
    Low,
    /// Some sources abbreviate this as `MED`.
    #[serde(rename = "MEDIUM", alias = "MED")]
    #[strum(to_string = "MEDIUM", serialize = "MED")]
    Medium,
    #[serde(rename = "HIGH")]
    #[strum(serialize = "HIGH")]
    High,
}

/// A named population frequency.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frequency {
    pub label: String,
    pub value: f64,
}

/// A named in-silico severity prediction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Severity {
    pub name: String,
    pub value: String,
}

/// Reference to a variant forming a compound heterozygous call with the
/// owning variant.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Compound {
    /// Id of the partner variant.
    pub variant_id: String,
    /// Combined score of the pair, if annotated.
    pub combined_score: Option<f64>,
}

/// Value used by frequency sources for "not applicable".
pub const UNKNOWN_FREQUENCY: f64 = -1.0;

/// A normalized variant together with all derived annotation.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Variant {
    /// Chromosome without `chr` prefix.
    pub chrom: String,
    /// 1-based position as given by the source.
    pub pos: u64,
    /// Value of the source's identifier column, e.g., dbSNP ids.
    pub rs_id: String,
    pub reference: String,
    pub alternative: String,
    pub quality: Option<f64>,
    pub filter: String,

    /// Identifier used to request this variant again.
    pub variant_id: String,
    /// 1-based position within the current result stream.
    pub index: Option<usize>,

    pub start: u64,
    pub stop: u64,
    /// Chromosome of the end point for structural variants.
    pub stop_chrom: Option<String>,
    pub sv_type: Option<String>,
    /// Length of a structural variant, infinite for translocations.
    pub sv_len: Option<f64>,
    pub cytoband_start: Option<String>,
    pub cytoband_stop: Option<String>,

    pub thousand_g: Option<f64>,
    pub max_freq: Option<f64>,
    pub cadd_score: Option<f64>,
    pub rank_score: Option<f64>,
    pub most_severe_consequence: Option<String>,
    pub impact_severity: Option<ImpactSeverity>,

    pub consequences: Vec<String>,
    pub gene_symbols: Vec<String>,
    pub genetic_models: Vec<String>,
    pub frequencies: Vec<Frequency>,
    pub severities: Vec<Severity>,
    pub transcripts: Vec<Transcript>,
    pub genotypes: Vec<Genotype>,
    pub genes: Vec<Gene>,
    /// Sorted by descending combined score.
    pub compounds: Vec<Compound>,
}

impl Variant {
    /// Create a new variant from the mandatory positional fields.
    ///
    /// The chromosome is stored without `chr` prefix and the variant id is
    /// derived from chromosome, position and alleles.
    pub fn new(
        chrom: &str,
        pos: u64,
        rs_id: &str,
        reference: &str,
        alternative: &str,
        quality: Option<f64>,
        filter: &str,
    ) -> Self {
        let chrom = crate::common::canonicalize(chrom).to_string();
        let variant_id = Self::content_id(&chrom, pos, reference, alternative);
        Variant {
            chrom,
            pos,
            rs_id: rs_id.to_string(),
            reference: reference.to_string(),
            alternative: alternative.to_string(),
            quality,
            filter: filter.to_string(),
            variant_id,
            start: pos,
            stop: pos,
            ..Default::default()
        }
    }

    /// Content-derived variant id, e.g., `1_880086_T_C`.
    pub fn content_id(chrom: &str, pos: u64, reference: &str, alternative: &str) -> String {
        format!(
            "{}_{}_{}_{}",
            crate::common::canonicalize(chrom),
            pos,
            reference,
            alternative
        )
    }

    /// Replace the content-derived id by a backend-native one.
    pub fn update_variant_id(&mut self, variant_id: &str) {
        tracing::debug!("Updating variant id to {}", variant_id);
        self.variant_id = variant_id.to_string();
    }

    pub fn add_frequency(&mut self, label: &str, value: f64) {
        tracing::debug!(
            "Adding frequency {} with value {} to variant {}",
            label,
            value,
            &self.variant_id
        );
        self.frequencies.push(Frequency {
            label: label.to_string(),
            value,
        });
    }

    pub fn add_severity(&mut self, name: &str, value: &str) {
        tracing::debug!(
            "Adding severity {} with value {} to variant {}",
            name,
            value,
            &self.variant_id
        );
        self.severities.push(Severity {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn add_transcript(&mut self, transcript: Transcript) {
        tracing::debug!(
            "Adding transcript {:?} to variant {}",
            &transcript.transcript_id,
            &self.variant_id
        );
        self.transcripts.push(transcript);
    }

    pub fn add_gene(&mut self, gene: Gene) {
        tracing::debug!("Adding gene {} to variant {}", &gene.symbol, &self.variant_id);
        self.genes.push(gene);
    }

    pub fn add_genotype(&mut self, genotype: Genotype) {
        tracing::debug!(
            "Adding genotype {} of {} to variant {}",
            &genotype.genotype,
            &genotype.sample_id,
            &self.variant_id
        );
        self.genotypes.push(genotype);
    }

    /// Add a compound, keeping the list sorted by descending score.
    ///
    /// Compounds without a score go last; equal scores keep insertion order.
    pub fn add_compound(&mut self, compound: Compound) {
        tracing::debug!(
            "Adding compound {} to variant {}",
            &compound.variant_id,
            &self.variant_id
        );
        let key = compound.combined_score.unwrap_or(f64::NEG_INFINITY);
        let pos = self
            .compounds
            .iter()
            .position(|c| c.combined_score.unwrap_or(f64::NEG_INFINITY) < key)
            .unwrap_or(self.compounds.len());
        self.compounds.insert(pos, compound);
    }

    /// Recompute `max_freq` from all frequencies, ignoring the "unknown"
    /// sentinel.  Leaves `max_freq` unset if no usable value exists.
    pub fn set_max_frequency(&mut self) {
        self.max_freq = self
            .frequencies
            .iter()
            .map(|f| f.value)
            .filter(|v| *v != UNKNOWN_FREQUENCY && !v.is_nan())
            .fold(None, |acc: Option<f64>, v| match acc {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            });
    }

    /// Set `max_freq` from a value precomputed by the backend.
    ///
    /// The "unknown" sentinel leaves the field untouched.
    pub fn set_max_frequency_to(&mut self, value: f64) {
        if value != UNKNOWN_FREQUENCY {
            self.max_freq = Some(value);
        }
    }

    /// Number of resolved genes.
    pub fn nr_genes(&self) -> usize {
        self.genes.len()
    }

    /// Whether the end point lies on a different chromosome.
    pub fn is_interchromosomal(&self) -> bool {
        self.stop_chrom
            .as_ref()
            .map(|stop_chrom| stop_chrom != &self.chrom)
            .unwrap_or(false)
    }

    /// Whether this is an inter-chromosomal translocation.
    pub fn is_translocation(&self) -> bool {
        self.sv_len == Some(f64::INFINITY)
    }
}
