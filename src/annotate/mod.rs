//! Enrichment of raw backend records into canonical variants.
//!
//! Backends expose their records through [`RawRecord`]; [`build_variant`]
//! runs all enrichers over one record.  The order of the enrichers matters:
//! transcripts are added before gene symbols are derived, and consequences
//! before the most severe consequence before the impact severity.

pub mod compounds;
pub mod consequences;
pub mod frequency;
pub mod genes;
pub mod genotype;
pub mod scores;
pub mod sv;
pub mod transcripts;

use crate::{
    err::Error,
    lookup::Lookups,
    model::{Case, Compound, Genotype, Individual, Transcript, Variant, VariantType},
};

/// Where the consequence terms of a record come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsequenceSource<'a> {
    /// Substring scan of the complete raw record line.
    Line(&'a str),
    /// Union of the consequences of the record's transcripts.
    Transcripts,
}

/// Typed field access to one raw record of a backend.
///
/// Only the positional fields are mandatory.  All other accessors default
/// to "absent", in which case the corresponding enrichment is skipped.
pub trait RawRecord {
    fn chrom(&self) -> &str;
    /// 1-based position.
    fn pos(&self) -> u64;
    fn reference(&self) -> &str;
    fn alternative(&self) -> &str;

    fn rs_id(&self) -> &str {
        "."
    }
    fn quality(&self) -> Option<f64> {
        None
    }
    fn filter(&self) -> &str {
        "."
    }
    /// Backend-native id replacing the content-derived one.
    fn native_id(&self) -> Option<String> {
        None
    }
    /// 1-based inclusive end position, if recorded.
    fn end(&self) -> Option<u64> {
        None
    }
    fn sv_type(&self) -> Option<String> {
        None
    }

    fn consequence_source(&self) -> ConsequenceSource<'_> {
        ConsequenceSource::Transcripts
    }
    /// Most severe consequence precomputed by the backend.
    fn most_severe_consequence(&self) -> Option<String> {
        None
    }
    /// Impact severity precomputed by the backend, possibly abbreviated.
    fn impact_severity(&self) -> Option<String> {
        None
    }
    fn transcripts(&self) -> Vec<Transcript> {
        Vec::new()
    }

    fn thousand_g(&self) -> Option<f64> {
        None
    }
    fn exac(&self) -> Option<f64> {
        None
    }
    /// Maximal population frequency precomputed by the backend.
    fn max_freq(&self) -> Option<f64> {
        None
    }
    fn occurrences(&self) -> Option<f64> {
        None
    }

    fn cadd(&self) -> Option<f64> {
        None
    }
    fn rank_score(&self) -> Option<f64> {
        None
    }
    fn genetic_models(&self) -> Vec<String> {
        Vec::new()
    }
    fn compounds(&self) -> Vec<Compound> {
        Vec::new()
    }
    /// Named predictions as `(name, value)` pairs.
    fn severities(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Call of `individual`, `None` if the record has none.
    fn genotype(&self, individual: &Individual) -> Option<Genotype>;
}

/// Stop position of a small variant: `pos + len(ref) - len(alt)`, never
/// before `pos`.
pub fn snv_stop(pos: u64, reference: &str, alternative: &str) -> u64 {
    pos + (reference.len().saturating_sub(alternative.len())) as u64
}

/// Build the canonical variant of `raw` with all enrichments applied.
///
/// Fails only if mandatory positional fields are missing.
pub fn build_variant<R: RawRecord + ?Sized>(
    raw: &R,
    case: &Case,
    lookups: &Lookups,
) -> Result<Variant, Error> {
    if raw.chrom().is_empty() || raw.reference().is_empty() || raw.alternative().is_empty() {
        return Err(Error::Parse(format!(
            "record at {}:{} lacks chromosome or alleles",
            raw.chrom(),
            raw.pos()
        )));
    }

    let mut variant = Variant::new(
        raw.chrom(),
        raw.pos(),
        raw.rs_id(),
        raw.reference(),
        raw.alternative(),
        raw.quality(),
        raw.filter(),
    );
    if let Some(native_id) = raw.native_id() {
        variant.update_variant_id(&native_id);
    }
    tracing::debug!("Creating a variant object of variant {}", &variant.variant_id);

    variant.start = raw.pos();
    match case.variant_type {
        VariantType::Sv => {
            variant.stop = raw.end().unwrap_or(variant.start);
            sv::add_sv_coordinates(&mut variant, raw.sv_type(), lookups.cytobands.as_ref());
            frequency::add_occurrences(&mut variant, raw.occurrences());
        }
        VariantType::Snv => {
            variant.stop = raw
                .end()
                .unwrap_or_else(|| snv_stop(variant.start, raw.reference(), raw.alternative()))
                .max(variant.start);
            transcripts::add_transcripts(&mut variant, raw.transcripts());
            frequency::add_thousand_g(&mut variant, raw.thousand_g());
            frequency::add_exac(&mut variant, raw.exac());
            frequency::add_gmaf(&mut variant);
        }
    }

    scores::add_cadd_score(&mut variant, raw.cadd());
    scores::add_severities(&mut variant, raw.severities());
    scores::add_genetic_models(&mut variant, raw.genetic_models());
    genotype::add_genotypes(&mut variant, raw, case);
    compounds::add_compounds(&mut variant, raw.compounds());

    genes::add_gene_symbols(&mut variant, lookups.gene_ranges.as_ref());
    genes::add_genes(&mut variant, lookups.genes.as_ref());
    genes::add_gene_ids(&mut variant, lookups.gene_ids.as_ref());

    let terms = match raw.consequence_source() {
        ConsequenceSource::Line(line) => consequences::scan_line(line),
        ConsequenceSource::Transcripts => consequences::from_transcripts(&variant.transcripts),
    };
    consequences::add_consequences(&mut variant, terms);
    consequences::add_most_severe_consequence(&mut variant, raw.most_severe_consequence());
    consequences::add_impact_severity(&mut variant, raw.impact_severity());

    scores::add_rank_score(&mut variant, raw.rank_score());
    frequency::add_max_frequency(&mut variant, raw.max_freq());

    Ok(variant)
}

#[cfg(test)]
mod test {
    use std::{path::PathBuf, sync::Arc};

    use float_cmp::approx_eq;
    use pretty_assertions::assert_eq;

    use super::{ConsequenceSource, RawRecord};
    use crate::{
        lookup::{cytobands::load_cytoband_db, genes::load_gene_db, Lookups},
        model::{
            Case, Compound, Genotype, ImpactSeverity, Individual, Transcript, VariantMode,
            VariantType,
        },
    };

    /// Minimal in-memory record.
    #[derive(Default)]
    pub struct TestRecord {
        pub chrom: String,
        pub pos: u64,
        pub reference: String,
        pub alternative: String,
        pub line: Option<String>,
        pub end: Option<u64>,
        pub transcripts: Vec<Transcript>,
        pub thousand_g: Option<f64>,
        pub compounds: Vec<Compound>,
        pub gts: Vec<(String, String)>,
    }

    impl RawRecord for TestRecord {
        fn chrom(&self) -> &str {
            &self.chrom
        }
        fn pos(&self) -> u64 {
            self.pos
        }
        fn reference(&self) -> &str {
            &self.reference
        }
        fn alternative(&self) -> &str {
            &self.alternative
        }
        fn end(&self) -> Option<u64> {
            self.end
        }
        fn consequence_source(&self) -> ConsequenceSource<'_> {
            match &self.line {
                Some(line) => ConsequenceSource::Line(line),
                None => ConsequenceSource::Transcripts,
            }
        }
        fn transcripts(&self) -> Vec<Transcript> {
            self.transcripts.clone()
        }
        fn thousand_g(&self) -> Option<f64> {
            self.thousand_g
        }
        fn compounds(&self) -> Vec<Compound> {
            self.compounds.clone()
        }
        fn genotype(&self, individual: &Individual) -> Option<Genotype> {
            self.gts
                .iter()
                .find(|(id, _)| id == &individual.ind_id)
                .map(|(_, gt)| Genotype {
                    genotype: gt.clone(),
                    ..Default::default()
                })
        }
    }

    fn case(variant_type: VariantType) -> Case {
        let mut case = Case::new("fam", PathBuf::from("x.vcf"), variant_type, VariantMode::Vcf);
        let mut child = Individual::new("child", "fam", 0, PathBuf::from("x.vcf"));
        child.phenotype = "2".into();
        case.add_individual(child);
        case.add_individual(Individual::new("mother", "fam", 1, PathBuf::from("x.vcf")));
        case
    }

    fn lookups() -> Lookups {
        let genes = load_gene_db(std::path::Path::new("tests/lookup/genes.tsv")).unwrap();
        let cytobands = load_cytoband_db(std::path::Path::new("tests/lookup/cytoBand.txt")).unwrap();
        Lookups::new(Arc::new(genes), Arc::new(cytobands))
    }

    #[test]
    fn snv_from_transcripts() -> Result<(), anyhow::Error> {
        let mut tx = Transcript {
            hgnc_symbol: Some("GLMN".into()),
            ensembl_id: Some("ENSG00000174842".into()),
            gmaf: Some("C:0.02".into()),
            ..Default::default()
        };
        tx.set_consequences("missense_variant&splice_region_variant");
        let raw = TestRecord {
            chrom: "chr1".into(),
            pos: 92498070,
            reference: "AT".into(),
            alternative: "A".into(),
            transcripts: vec![tx],
            gts: vec![("child".into(), "0/1".into()), ("mother".into(), "0/0".into())],
            ..Default::default()
        };

        let v = super::build_variant(&raw, &case(VariantType::Snv), &lookups())?;

        assert_eq!(v.variant_id, "1_92498070_AT_A");
        assert_eq!(v.start, 92498070);
        assert_eq!(v.stop, 92498071);
        assert_eq!(v.gene_symbols, vec!["GLMN"]);
        assert_eq!(v.genes.len(), 1);
        assert_eq!(
            v.consequences,
            vec!["missense_variant", "splice_region_variant"]
        );
        assert_eq!(v.most_severe_consequence.as_deref(), Some("missense_variant"));
        assert_eq!(v.impact_severity, Some(ImpactSeverity::Medium));
        assert_eq!(v.thousand_g, Some(0.02));
        assert!(approx_eq!(f64, v.max_freq.unwrap(), 0.02));
        assert_eq!(v.genotypes.len(), 2);
        assert_eq!(v.genotypes[0].sample_id, "child");
        assert_eq!(v.genotypes[0].case_id, "fam");
        assert!(v.genotypes[0].is_affected());
        assert_eq!(v.sv_len, None);
        Ok(())
    }

    #[test]
    fn snv_from_line_scan() -> Result<(), anyhow::Error> {
        let raw = TestRecord {
            chrom: "1".into(),
            pos: 10,
            reference: "A".into(),
            alternative: "AGG".into(),
            line: Some("1\t10\t.\tA\tAGG\t.\tPASS\tX=stop_gained".into()),
            thousand_g: Some(0.001),
            compounds: vec![
                Compound {
                    variant_id: "a".into(),
                    combined_score: Some(1.0),
                },
                Compound {
                    variant_id: "b".into(),
                    combined_score: Some(9.0),
                },
            ],
            ..Default::default()
        };

        let v = super::build_variant(&raw, &case(VariantType::Snv), &Lookups::default())?;

        assert_eq!(v.stop, 10);
        assert_eq!(v.consequences, vec!["stop_gained"]);
        assert_eq!(v.impact_severity, Some(ImpactSeverity::High));
        assert_eq!(v.compounds[0].variant_id, "b");
        assert!(v.genes.is_empty());
        assert_eq!(v.max_freq, Some(0.001));
        Ok(())
    }

    #[test]
    fn sv_coordinates() -> Result<(), anyhow::Error> {
        let raw = TestRecord {
            chrom: "1".into(),
            pos: 1000,
            reference: "N".into(),
            alternative: "N[chrX:200[".into(),
            ..Default::default()
        };

        let v = super::build_variant(&raw, &case(VariantType::Sv), &lookups())?;

        assert_eq!(v.sv_len, Some(f64::INFINITY));
        assert_eq!(v.sv_type.as_deref(), Some("BND"));
        assert_eq!(v.cytoband_start.as_deref(), Some("1p36.33"));
        assert!(v.transcripts.is_empty());
        Ok(())
    }

    #[test]
    fn missing_alleles_is_parse_error() {
        let raw = TestRecord {
            chrom: "1".into(),
            pos: 10,
            reference: "A".into(),
            ..Default::default()
        };
        let err = super::build_variant(&raw, &case(VariantType::Snv), &Lookups::default())
            .unwrap_err();
        assert!(matches!(err, crate::err::Error::Parse(_)));
    }

    #[test]
    fn snv_stop() {
        assert_eq!(super::snv_stop(10, "A", "G"), 10);
        assert_eq!(super::snv_stop(10, "ATT", "A"), 12);
        assert_eq!(super::snv_stop(10, "A", "ATT"), 10);
    }
}
