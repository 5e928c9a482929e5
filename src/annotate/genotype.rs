//! Genotype calls of the case's individuals.

use super::RawRecord;
use crate::model::{Case, Variant};

/// Add one genotype per individual of `case`, in case order.
///
/// Individuals without a call in `raw` are skipped.
pub fn add_genotypes<R: RawRecord + ?Sized>(variant: &mut Variant, raw: &R, case: &Case) {
    for individual in &case.individuals {
        match raw.genotype(individual) {
            Some(mut genotype) => {
                genotype.sample_id = individual.ind_id.clone();
                genotype.case_id = case.case_id.clone();
                genotype.phenotype = individual.phenotype.clone();
                variant.add_genotype(genotype);
            }
            None => tracing::debug!(
                "no call for {} at variant {}",
                &individual.ind_id,
                &variant.variant_id
            ),
        }
    }
}
