//! Structural variant coordinates.

use std::sync::OnceLock;

use regex::Regex;

use crate::{common::canonicalize, lookup::CytobandResolver, model::Variant};

/// SV type assigned to translocations.
pub const BND: &str = "BND";

/// Partner coordinate of a breakend alternate allele.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakend {
    /// Partner chromosome without `chr` prefix.
    pub chrom: String,
    pub pos: Option<u64>,
}

fn breakend_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\[\]]?([^\[\]:]+):(\d+)[\[\]]?").expect("invalid regex in source code")
    })
}

/// Parse the partner of a breakend allele such as `N[chr2:321682[` or
/// `]13:123456]T`.  Returns `None` for alleles without breakend notation.
pub fn parse_breakend(alternative: &str) -> Option<Breakend> {
    if !alternative.contains(':') {
        return None;
    }
    match breakend_regex().captures(alternative) {
        Some(captures) => Some(Breakend {
            chrom: canonicalize(&captures[1]).to_string(),
            pos: captures[2].parse().ok(),
        }),
        None => {
            let stripped = alternative.trim_matches(|c| "ACGTN[]".contains(c));
            let chrom = stripped.split(':').next().unwrap_or_default();
            Some(Breakend {
                chrom: canonicalize(chrom).to_string(),
                pos: None,
            })
        }
    }
}

/// Set stop chromosome, length, type and cytobands of a structural variant.
///
/// `start` and `stop` must already be set.  Translocations get an infinite
/// length and type [`BND`].
pub fn add_sv_coordinates(
    variant: &mut Variant,
    sv_type: Option<String>,
    cytobands: &dyn CytobandResolver,
) {
    variant.stop_chrom = Some(variant.chrom.clone());
    match parse_breakend(&variant.alternative) {
        Some(breakend) => {
            tracing::debug!(
                "variant {} is a translocation to {:?}",
                &variant.variant_id,
                &breakend
            );
            variant.stop_chrom = Some(breakend.chrom);
            variant.sv_len = Some(f64::INFINITY);
            variant.sv_type = Some(BND.to_string());
        }
        None => {
            variant.sv_len = Some(variant.stop.saturating_sub(variant.start) as f64);
            variant.sv_type = sv_type;
        }
    }

    variant.cytoband_start = cytobands.cytoband(&variant.chrom, variant.start);
    variant.cytoband_stop = variant
        .stop_chrom
        .as_deref()
        .and_then(|stop_chrom| cytobands.cytoband(stop_chrom, variant.stop));
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        lookup::{CytobandDb, NoLookup},
        model::Variant,
    };

    #[rstest]
    #[case("N[chr2:321682[", Some(("2", Some(321682))))]
    #[case("]13:123456]T", Some(("13", Some(123456))))]
    #[case("G]chrX:198982]", Some(("X", Some(198982))))]
    #[case("<DEL>", None)]
    #[case("A", None)]
    fn parse_breakend(#[case] alt: &str, #[case] expected: Option<(&str, Option<u64>)>) {
        let actual = super::parse_breakend(alt);
        assert_eq!(
            actual.as_ref().map(|b| (b.chrom.as_str(), b.pos)),
            expected
        );
    }

    #[test]
    fn deletion() {
        let mut v = Variant::new("1", 1000, ".", "N", "<DEL>", None, "PASS");
        v.stop = 6000;
        super::add_sv_coordinates(&mut v, Some("DEL".into()), &NoLookup);
        assert_eq!(v.sv_len, Some(5000.0));
        assert_eq!(v.sv_type.as_deref(), Some("DEL"));
        assert_eq!(v.stop_chrom.as_deref(), Some("1"));
        assert!(!v.is_interchromosomal());
        assert_eq!(v.cytoband_start, None);
    }

    #[test]
    fn translocation() {
        let mut v = Variant::new("1", 1000, ".", "N", "N[chrX:200[", None, "PASS");
        super::add_sv_coordinates(&mut v, Some("TRA".into()), &NoLookup);
        assert_eq!(v.sv_len, Some(f64::INFINITY));
        assert!(v.is_translocation());
        assert_eq!(v.sv_type.as_deref(), Some("BND"));
        assert_eq!(v.stop_chrom.as_deref(), Some("X"));
        assert!(v.is_interchromosomal());
    }

    #[test]
    fn cytobands() -> Result<(), anyhow::Error> {
        let db = crate::lookup::cytobands::load_cytoband_db(std::path::Path::new(
            "tests/lookup/cytoBand.txt",
        ))?;
        let mut v = Variant::new("1", 1000, ".", "N", "N[chrX:200[", None, "PASS");
        super::add_sv_coordinates(&mut v, None, &db);
        assert_eq!(v.cytoband_start.as_deref(), Some("1p36.33"));
        assert_eq!(v.cytoband_stop.as_deref(), Some("Xp22.33"));

        let empty = CytobandDb::default();
        super::add_sv_coordinates(&mut v, None, &empty);
        assert_eq!(v.cytoband_start, None);
        Ok(())
    }
}
