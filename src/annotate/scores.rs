//! Variant level scores, predictions and inheritance models.

use crate::model::Variant;

/// Parse a family-scoped rank score such as `fam1:12,fam2:14`.
///
/// The value of the last family is used.
pub fn parse_rank_score(entry: &str) -> Option<f64> {
    entry
        .split(',')
        .last()
        .and_then(|family| family.rsplit(':').next())
        .and_then(|value| value.trim().parse::<f64>().ok())
}

/// Parse family-scoped genetic models such as `fam1:AR_hom|AR_comp`.
pub fn parse_genetic_models(entry: &str) -> Vec<String> {
    entry
        .split(',')
        .filter_map(|family| family.rsplit(':').next())
        .flat_map(|models| models.split('|'))
        .filter(|model| !model.is_empty())
        .map(|model| model.to_string())
        .collect()
}

pub fn add_cadd_score(variant: &mut Variant, value: Option<f64>) {
    if let Some(value) = value {
        tracing::debug!("Updating cadd_score to: {}", value);
        variant.cadd_score = Some(value);
    }
}

pub fn add_rank_score(variant: &mut Variant, value: Option<f64>) {
    if let Some(value) = value {
        tracing::debug!("Updating rank_score to: {}", value);
        variant.rank_score = Some(value);
    }
}

pub fn add_genetic_models(variant: &mut Variant, models: Vec<String>) {
    if !models.is_empty() {
        tracing::debug!("Updating genetic models to: {}", models.join(", "));
        variant.genetic_models = models;
    }
}

/// Add named in-silico predictions, e.g., `("SIFT", "deleterious")`.
pub fn add_severities(variant: &mut Variant, severities: Vec<(String, String)>) {
    for (name, value) in severities {
        variant.add_severity(&name, &value);
    }
}
