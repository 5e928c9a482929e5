//! Sequence Ontology consequences, their ranking and impact buckets.

use crate::model::{ImpactSeverity, Transcript, Variant};

/// Sequence Ontology terms ordered from most to least severe.
pub const SO_TERMS: &[&str] = &[
    "transcript_ablation",
    "splice_donor_variant",
    "splice_acceptor_variant",
    "stop_gained",
    "frameshift_variant",
    "stop_lost",
    "start_lost",
    "initiator_codon_variant",
    "transcript_amplification",
    "inframe_insertion",
    "inframe_deletion",
    "missense_variant",
    "protein_altering_variant",
    "splice_region_variant",
    "incomplete_terminal_codon_variant",
    "stop_retained_variant",
    "synonymous_variant",
    "coding_sequence_variant",
    "mature_miRNA_variant",
    "5_prime_UTR_variant",
    "3_prime_UTR_variant",
    "non_coding_exon_variant",
    "non_coding_transcript_exon_variant",
    "nc_transcript_variant",
    "intron_variant",
    "NMD_transcript_variant",
    "non_coding_transcript_variant",
    "upstream_gene_variant",
    "downstream_gene_variant",
    "TFBS_ablation",
    "TFBS_amplification",
    "TF_binding_site_variant",
    "regulatory_region_ablation",
    "regulatory_region_amplification",
    "regulatory_region_variant",
    "feature_elongation",
    "feature_truncation",
    "intergenic_variant",
];

/// Rank of `term` in [`SO_TERMS`], 0 being the most severe.
pub fn severity_rank(term: &str) -> Option<usize> {
    SO_TERMS.iter().position(|t| *t == term)
}

/// Impact bucket of a consequence term.
///
/// Also covers snpEff terms that are not part of [`SO_TERMS`].
pub fn impact_of(term: &str) -> Option<ImpactSeverity> {
    use ImpactSeverity::*;

    Some(match term {
        "transcript_ablation"
        | "splice_acceptor_variant"
        | "splice_donor_variant"
        | "stop_gained"
        | "stop_lost"
        | "frameshift_variant"
        | "start_lost"
        | "initiator_codon_variant"
        | "chromosomal_deletion"
        | "rare_amino_acid_variant" => High,

        "missense_variant"
        | "inframe_insertion"
        | "inframe_deletion"
        | "disruptive_inframe_deletion"
        | "disruptive_inframe_insertion"
        | "exon_loss_variant"
        | "5_prime_UTR_truncation"
        | "3_prime_UTR_truncation"
        | "splice_region_variant"
        | "mature_miRNA_variant"
        | "regulatory_region_variant"
        | "TF_binding_site_variant"
        | "regulatory_region_ablation"
        | "regulatory_region_amplification"
        | "TFBS_ablation"
        | "TFBS_amplification" => Medium,

        "stop_retained_variant"
        | "synonymous_variant"
        | "5_prime_UTR_variant"
        | "3_prime_UTR_variant"
        | "intron_variant"
        | "coding_sequence_variant"
        | "upstream_gene_variant"
        | "downstream_gene_variant"
        | "intergenic_variant"
        | "conserved_intergenic_variant"
        | "intragenic_variant"
        | "gene_variant"
        | "transcript_variant"
        | "exon_variant"
        | "5_prime_UTR_premature_start_codon_gain_variant"
        | "start_retained_variant"
        | "conserved_intron_variant"
        | "nc_transcript_variant"
        | "NMD_transcript_variant"
        | "incomplete_terminal_codon_variant"
        | "non_coding_exon_variant"
        | "transcript_amplification"
        | "feature_elongation"
        | "feature_truncation" => Low,

        _ => return None,
    })
}

/// Terms of [`SO_TERMS`] occurring anywhere in `line`, in vocabulary order.
///
/// This is a plain substring scan over the whole record line, so a term that
/// appears inside an identifier is reported as well.
pub fn scan_line(line: &str) -> Vec<String> {
    SO_TERMS
        .iter()
        .filter(|term| line.contains(**term))
        .map(|term| term.to_string())
        .collect()
}

/// Union of the transcripts' consequences in first-seen order.
pub fn from_transcripts(transcripts: &[Transcript]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for term in transcripts.iter().flat_map(|tx| tx.consequences.iter()) {
        if !result.contains(term) {
            result.push(term.clone());
        }
    }
    result
}

/// The ranked term with the lowest rank; unranked terms are ignored.
pub fn most_severe<S: AsRef<str>>(consequences: &[S]) -> Option<String> {
    consequences
        .iter()
        .filter_map(|c| severity_rank(c.as_ref()).map(|rank| (rank, c.as_ref())))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, term)| term.to_string())
}

/// Set the consequence list of `variant`.
pub fn add_consequences(variant: &mut Variant, consequences: Vec<String>) {
    tracing::debug!(
        "Updating consequences of {} to {:?}",
        &variant.variant_id,
        &consequences
    );
    variant.consequences = consequences;
}

/// Derive the most severe consequence from the consequence list unless
/// `precomputed` is given.
pub fn add_most_severe_consequence(variant: &mut Variant, precomputed: Option<String>) {
    variant.most_severe_consequence = precomputed
        .filter(|term| !term.is_empty())
        .or_else(|| most_severe(&variant.consequences));
}

/// Derive the impact severity from the most severe consequence unless
/// `precomputed` is given.
///
/// A precomputed value is parsed leniently, `MED` becomes `MEDIUM`.
pub fn add_impact_severity(variant: &mut Variant, precomputed: Option<String>) {
    let parsed = precomputed.and_then(|raw| match raw.trim().parse::<ImpactSeverity>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!("ignoring unknown impact severity {:?}", &raw);
            None
        }
    });
    variant.impact_severity = parsed.or_else(|| {
        variant
            .most_severe_consequence
            .as_deref()
            .and_then(impact_of)
    });
}
