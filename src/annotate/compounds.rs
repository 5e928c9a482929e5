//! Compound heterozygous partners.

use crate::model::{Compound, Variant};

/// Parse a family-scoped compounds entry.
///
/// The format is `family:id>score|id>score,family2:id>score`; a partner
/// without `>score` gets no combined score.
pub fn parse(entry: &str) -> Vec<Compound> {
    entry
        .split(',')
        .filter_map(|family| family.rsplit(':').next())
        .flat_map(|partners| partners.split('|'))
        .filter(|partner| !partner.is_empty())
        .map(|partner| match partner.split_once('>') {
            Some((variant_id, score)) => Compound {
                variant_id: variant_id.to_string(),
                combined_score: score.trim().parse::<f64>().ok(),
            },
            None => Compound {
                variant_id: partner.to_string(),
                combined_score: None,
            },
        })
        .collect()
}

/// Attach compounds, highest combined score first.
pub fn add_compounds(variant: &mut Variant, compounds: Vec<Compound>) {
    for compound in compounds {
        variant.add_compound(compound);
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::model::Variant;

    #[test]
    fn parse_families() {
        let compounds =
            super::parse("fam:1_10_A_G>12|1_20_C_T>25,fam2:1_30_G_A>3|1_40_T_C");
        assert_eq!(
            compounds
                .iter()
                .map(|c| (c.variant_id.as_str(), c.combined_score))
                .collect::<Vec<_>>(),
            vec![
                ("1_10_A_G", Some(12.0)),
                ("1_20_C_T", Some(25.0)),
                ("1_30_G_A", Some(3.0)),
                ("1_40_T_C", None),
            ]
        );
    }

    #[test]
    fn parse_empty() {
        assert!(super::parse("").is_empty());
        assert!(super::parse("fam:").is_empty());
    }

    #[test]
    fn add_sorts_descending() {
        let mut v = Variant::new("1", 10, ".", "A", "G", None, "PASS");
        super::add_compounds(
            &mut v,
            super::parse("fam:a>12|b>25,fam2:c>3|d"),
        );
        assert_eq!(
            v.compounds
                .iter()
                .map(|c| c.variant_id.as_str())
                .collect::<Vec<_>>(),
            vec!["b", "a", "c", "d"]
        );
    }
}
