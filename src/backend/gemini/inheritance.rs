//! Inheritance models evaluated on the genotype classes of a case.
//!
//! Models are named as in the `GeneticModels` annotation of flat files.

use std::collections::BTreeSet;

use itertools::Itertools;
use multimap::MultiMap;

use super::row::GeminiRow;
use crate::{
    common::{canonicalize, GenotypeClass},
    model::{Case, Compound, Individual},
};

pub const AR_HOM: &str = "AR_hom";
pub const AR_COMP: &str = "AR_comp";
pub const AD: &str = "AD";
pub const AD_DN: &str = "AD_dn";
pub const XR: &str = "XR";
pub const XD: &str = "XD";

fn is_autosomal(chrom: &str) -> bool {
    !matches!(canonicalize(chrom), "X" | "Y" | "M" | "MT")
}

fn is_x(chrom: &str) -> bool {
    canonicalize(chrom) == "X"
}

/// At least one affected individual, and all of them satisfy `pred`.
fn all_affected<F>(row: &GeminiRow, case: &Case, pred: F) -> bool
where
    F: Fn(&Individual, GenotypeClass) -> bool,
{
    let mut affected = case.affected().peekable();
    affected.peek().is_some()
        && affected.all(|individual| pred(individual, row.genotype_class(individual)))
}

fn all_unaffected<F>(row: &GeminiRow, case: &Case, pred: F) -> bool
where
    F: Fn(&Individual, GenotypeClass) -> bool,
{
    case.unaffected()
        .all(|individual| pred(individual, row.genotype_class(individual)))
}

fn autosomal_recessive_homozygous(row: &GeminiRow, case: &Case) -> bool {
    is_autosomal(&row.chrom)
        && all_affected(row, case, |_, gt| gt == GenotypeClass::HomAlt)
        && all_unaffected(row, case, |_, gt| gt != GenotypeClass::HomAlt)
}

fn autosomal_dominant(row: &GeminiRow, case: &Case) -> bool {
    is_autosomal(&row.chrom)
        && all_affected(row, case, |_, gt| gt.is_variant())
        && all_unaffected(row, case, |_, gt| !gt.is_variant())
}

/// An affected child carries the variant while both parents are
/// homozygous reference.
fn de_novo(row: &GeminiRow, case: &Case) -> bool {
    case.affected().any(|child| {
        let parent = |id: &str| case.individual(id).map(|parent| row.genotype_class(parent));
        child.has_father()
            && child.has_mother()
            && row.genotype_class(child).is_variant()
            && parent(&child.father) == Some(GenotypeClass::HomRef)
            && parent(&child.mother) == Some(GenotypeClass::HomRef)
    })
}

/// Hemizygous males count as homozygous.
fn x_recessive(row: &GeminiRow, case: &Case) -> bool {
    let hom = |individual: &Individual, gt: GenotypeClass| {
        gt == GenotypeClass::HomAlt || (individual.is_male() && gt.is_variant())
    };
    is_x(&row.chrom)
        && all_affected(row, case, hom)
        && all_unaffected(row, case, |individual, gt| !hom(individual, gt))
}

fn x_dominant(row: &GeminiRow, case: &Case) -> bool {
    is_x(&row.chrom)
        && all_affected(row, case, |_, gt| gt.is_variant())
        && all_unaffected(row, case, |_, gt| !gt.is_variant())
}

/// Row that may be one half of a compound heterozygous pair.
fn compound_candidate(row: &GeminiRow, case: &Case) -> bool {
    is_autosomal(&row.chrom)
        && all_affected(row, case, |_, gt| gt == GenotypeClass::Het)
        && all_unaffected(row, case, |_, gt| gt != GenotypeClass::HomAlt)
}

/// Unaffected individuals must not carry both variants of a pair.
fn valid_pair(first: &GeminiRow, second: &GeminiRow, case: &Case) -> bool {
    !case.unaffected().any(|individual| {
        first.genotype_class(individual).is_variant()
            && second.genotype_class(individual).is_variant()
    })
}

type ModelCheck = fn(&GeminiRow, &Case) -> bool;

const SINGLE_SITE_MODELS: &[(&str, ModelCheck)] = &[
    (AR_HOM, autosomal_recessive_homozygous),
    (AD, autosomal_dominant),
    (AD_DN, de_novo),
    (XR, x_recessive),
    (XD, x_dominant),
];

/// Tag `rows` with the requested models they match.
///
/// Compound heterozygous rows are paired per gene and receive compounds
/// pointing at their partners.
pub fn annotate(rows: &mut [GeminiRow], case: &Case, requested: &BTreeSet<&str>) {
    for row in rows.iter_mut() {
        for (name, check) in SINGLE_SITE_MODELS {
            if requested.contains(name) && check(row, case) {
                row.genetic_models.push(name.to_string());
            }
        }
    }
    if requested.contains(AR_COMP) {
        compound_heterozygous(rows, case);
    }
}

fn compound_heterozygous(rows: &mut [GeminiRow], case: &Case) {
    let mut by_gene: MultiMap<&str, usize> = MultiMap::new();
    for (idx, row) in rows.iter().enumerate() {
        match row.gene.as_deref().filter(|gene| !gene.is_empty()) {
            Some(gene) if compound_candidate(row, case) => by_gene.insert(gene, idx),
            _ => (),
        }
    }

    let mut pairs = Vec::new();
    for (gene, idxs) in by_gene.iter_all() {
        for (&first, &second) in idxs.iter().tuple_combinations() {
            if valid_pair(&rows[first], &rows[second], case) {
                tracing::debug!(
                    "compound pair {} / {} in {}",
                    rows[first].variant_id,
                    rows[second].variant_id,
                    gene
                );
                pairs.push((first, second));
            }
        }
    }

    for (first, second) in pairs {
        link(rows, first, second);
        link(rows, second, first);
    }
}

fn link(rows: &mut [GeminiRow], idx: usize, partner: usize) {
    let compound = Compound {
        variant_id: rows[partner].variant_id.to_string(),
        combined_score: rows[idx]
            .cadd_scaled
            .zip(rows[partner].cadd_scaled)
            .map(|(a, b)| a + b),
    };
    let row = &mut rows[idx];
    if !row.genetic_models.iter().any(|model| model == AR_COMP) {
        row.genetic_models.push(AR_COMP.to_string());
    }
    row.compounds.push(compound);
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::annotate;
    use crate::{
        backend::gemini::row::GeminiRow,
        model::{Case, Individual, VariantMode, VariantType},
    };

    /// Trio with affected son and unaffected parents.
    fn trio() -> Case {
        let mut case = Case::new("fam", "x.db".into(), VariantType::Snv, VariantMode::Gemini);
        let mut child = Individual::new("child", "fam", 0, "x.db".into());
        child.father = "father".into();
        child.mother = "mother".into();
        child.sex = "1".into();
        child.phenotype = "2".into();
        let mut father = Individual::new("father", "fam", 1, "x.db".into());
        father.sex = "1".into();
        father.phenotype = "1".into();
        let mut mother = Individual::new("mother", "fam", 2, "x.db".into());
        mother.sex = "2".into();
        mother.phenotype = "1".into();
        for individual in [child, father, mother] {
            case.add_individual(individual);
        }
        case
    }

    fn row(variant_id: i64, chrom: &str, gene: &str, gt_types: [i64; 3]) -> GeminiRow {
        GeminiRow {
            variant_id,
            chrom: chrom.into(),
            gene: Some(gene.into()),
            gt_types: gt_types.to_vec(),
            ..Default::default()
        }
    }

    fn models(rows: &[GeminiRow]) -> Vec<Vec<&str>> {
        rows.iter()
            .map(|row| row.genetic_models.iter().map(String::as_str).collect())
            .collect()
    }

    #[rstest]
    #[case("chr1", [3, 1, 1], vec!["AR_hom"])]
    #[case("chr1", [1, 0, 0], vec!["AD", "AD_dn"])]
    #[case("chr1", [1, 1, 0], vec![])]
    #[case("chrX", [3, 0, 1], vec!["XR"])]
    #[case("chrX", [1, 0, 1], vec!["XR"])]
    #[case("chrX", [1, 0, 0], vec!["XR", "XD", "AD_dn"])]
    #[case("chrX", [0, 0, 1], vec![])]
    fn single_site(#[case] chrom: &str, #[case] gt_types: [i64; 3], #[case] expected: Vec<&str>) {
        let requested: BTreeSet<&str> = ["AR_hom", "AD", "AD_dn", "XR", "XD"].into();
        let mut rows = vec![row(1, chrom, "G", gt_types)];
        annotate(&mut rows, &trio(), &requested);
        let mut actual = models(&rows).remove(0);
        let mut expected = expected;
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn only_requested_models_are_tagged() {
        let mut rows = vec![row(1, "1", "G", [1, 0, 0])];
        annotate(&mut rows, &trio(), &["AD_dn"].into());
        assert_eq!(models(&rows), vec![vec!["AD_dn"]]);
    }

    #[test]
    fn compound_heterozygous() {
        let mut rows = vec![
            // inherited from the father
            row(1, "1", "GLMN", [1, 1, 0]),
            // inherited from the mother
            row(2, "1", "GLMN", [1, 0, 1]),
            // carried by the father together with variant 1
            row(3, "1", "GLMN", [1, 1, 0]),
            // alone in its gene
            row(4, "1", "RPL5", [1, 0, 1]),
        ];
        rows[0].cadd_scaled = Some(20.0);
        rows[1].cadd_scaled = Some(15.0);
        annotate(&mut rows, &trio(), &["AR_comp"].into());

        assert_eq!(
            models(&rows),
            vec![vec!["AR_comp"], vec!["AR_comp"], vec!["AR_comp"], vec![]]
        );
        assert_eq!(
            rows[0]
                .compounds
                .iter()
                .map(|c| (c.variant_id.as_str(), c.combined_score))
                .collect::<Vec<_>>(),
            vec![("2", Some(35.0))]
        );
        let mut partners: Vec<&str> = rows[1]
            .compounds
            .iter()
            .map(|c| c.variant_id.as_str())
            .collect();
        partners.sort();
        assert_eq!(partners, vec!["1", "3"]);
        assert!(rows[3].compounds.is_empty());
    }

    #[test]
    fn no_affected_no_models() {
        let mut case = trio();
        case.individuals[0].phenotype = "1".into();
        let mut rows = vec![row(1, "1", "G", [3, 0, 0])];
        annotate(&mut rows, &case, &["AR_hom", "AD"].into());
        assert_eq!(models(&rows), vec![Vec::<&str>::new()]);
    }
}
