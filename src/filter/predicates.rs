//! Post-hoc evaluation of the filter predicates on enriched variants.

use std::collections::BTreeSet;

use super::{FilterSpec, Predicate, Range};
use crate::{common::canonicalize, model::Variant};

fn any_overlap<'a, I>(values: I, requested: &BTreeSet<&str>) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    values
        .into_iter()
        .any(|value| requested.contains(value.as_str()))
}

fn in_range(variant: &Variant, range: &Range) -> bool {
    canonicalize(&variant.chrom) == canonicalize(range.chromosome.trim())
        && variant.start >= range.start
        && variant.stop <= range.end
}

/// Evaluate a single active predicate.
fn check(variant: &Variant, filter: &FilterSpec, predicate: Predicate) -> bool {
    match predicate {
        Predicate::Gene => {
            let requested = filter.gene_ids();
            any_overlap(&variant.gene_symbols, &requested)
                || variant
                    .genes
                    .iter()
                    .any(|gene| requested.contains(gene.symbol.as_str()))
        }
        // Variants without any frequency pass the ceiling.
        Predicate::Frequency => match (variant.max_freq, filter.frequency()) {
            (Some(value), Some(ceiling)) => value <= ceiling,
            _ => true,
        },
        Predicate::Cadd => match (variant.cadd_score, filter.cadd()) {
            (Some(value), Some(floor)) => value > floor,
            (None, Some(_)) => false,
            _ => true,
        },
        Predicate::Consequence => any_overlap(&variant.consequences, &filter.consequences()),
        Predicate::ImpactSeverity => variant
            .impact_severity
            .map(|impact| filter.impact_severities().contains(&impact))
            .unwrap_or(false),
        Predicate::SvLen => match (variant.sv_len, filter.sv_len()) {
            (Some(value), Some(floor)) => value > floor,
            (None, Some(_)) => false,
            _ => true,
        },
        Predicate::SvType => variant
            .sv_type
            .as_deref()
            .map(|sv_type| filter.sv_types().contains(sv_type))
            .unwrap_or(false),
        Predicate::GeneticModel => any_overlap(&variant.genetic_models, &filter.genetic_models()),
        Predicate::Range => filter
            .range()
            .map(|range| in_range(variant, range))
            .unwrap_or(true),
    }
}

/// Whether `variant` passes all active predicates of `filter` that are not
/// in `native`, i.e., not already evaluated by the backend.
pub fn passes(variant: &Variant, filter: &FilterSpec, native: &BTreeSet<Predicate>) -> bool {
    use strum::IntoEnumIterator;

    for predicate in Predicate::iter() {
        if native.contains(&predicate) || !filter.is_active(predicate) {
            continue;
        }
        if !check(variant, filter, predicate) {
            tracing::trace!(
                "variant {} fails predicate {}",
                &variant.variant_id,
                predicate
            );
            return false;
        }
    }
    true
}
