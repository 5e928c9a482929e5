//! Population frequencies.

use crate::model::Variant;

/// Label of the 1000 Genomes frequency.
pub const THOUSAND_G: &str = "1000GAF";
/// Label of the ExAC frequency.
pub const EXAC: &str = "ExAC";
/// Label of the transcript-embedded global minor allele frequency.
pub const GMAF: &str = "GMAF";
/// Label of the in-house occurrence frequency of structural variants.
pub const OCC: &str = "OCC";

/// Parse a frequency embedded by the annotator, e.g., `"G:0.0012"`.
///
/// Entries may be joined by `&`; the largest value wins.
pub fn parse_embedded(raw: &str) -> Option<f64> {
    raw.split('&')
        .filter_map(|entry| entry.rsplit(':').next())
        .filter_map(|value| value.trim().parse::<f64>().ok())
        .fold(None, |acc: Option<f64>, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

/// Add the primary 1000 Genomes frequency if present.
pub fn add_thousand_g(variant: &mut Variant, value: Option<f64>) {
    if let Some(value) = value {
        tracing::debug!("Updating thousand_g to: {}", value);
        variant.thousand_g = Some(value);
        variant.add_frequency(THOUSAND_G, value);
    }
}

/// Add the ExAC frequency, falling back to the first transcript carrying
/// an embedded ExAC value.
pub fn add_exac(variant: &mut Variant, value: Option<f64>) {
    let value = value.or_else(|| {
        variant
            .transcripts
            .iter()
            .filter_map(|tx| tx.exac_maf.as_deref())
            .find_map(parse_embedded)
    });
    if let Some(value) = value {
        variant.add_frequency(EXAC, value);
    }
}

/// Add the GMAF of every transcript carrying one.
///
/// The first value also becomes the 1000 Genomes frequency if the primary
/// value is absent.
pub fn add_gmaf(variant: &mut Variant) {
    let values: Vec<f64> = variant
        .transcripts
        .iter()
        .filter_map(|tx| tx.gmaf.as_deref())
        .filter_map(parse_embedded)
        .collect();
    for gmaf in values {
        variant.add_frequency(GMAF, gmaf);
        if variant.thousand_g.is_none() {
            tracing::debug!("Updating thousand_g from GMAF to: {}", gmaf);
            variant.thousand_g = Some(gmaf);
        }
    }
}

/// Add the occurrence frequency of a structural variant.
pub fn add_occurrences(variant: &mut Variant, value: Option<f64>) {
    if let Some(value) = value {
        tracing::debug!("Updating occurrences to: {}", value);
        variant.add_frequency(OCC, value);
    }
}

/// Set `max_freq`, either from a backend-precomputed value or from the
/// collected frequencies.
pub fn add_max_frequency(variant: &mut Variant, precomputed: Option<f64>) {
    match precomputed {
        Some(value) => variant.set_max_frequency_to(value),
        None => variant.set_max_frequency(),
    }
}
