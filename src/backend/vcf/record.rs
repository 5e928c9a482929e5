//! Data lines of a VCF file as raw records.

use noodles_vcf as vcf;
use vcf::record::genotypes::{keys::key, sample::value::Array, sample::Value, Sample};

use super::header::VcfHeader;
use crate::{
    annotate::{
        compounds,
        frequency::THOUSAND_G,
        scores,
        transcripts::{self, AnnotationFormat},
        ConsequenceSource, RawRecord,
    },
    err::Error,
    model::{Compound, Genotype, Individual, Transcript},
};

/// INFO keys under which annotators write the ExAC frequency.
const EXAC_KEYS: &[&str] = &["ExAC", "EXAC", "ExACAF", "EXACAF"];

/// Missing value of the fixed columns.
const MISSING: &str = ".";

/// One data line, parsed against the file's header.
#[derive(Debug, Clone)]
pub struct VcfRecord<'a> {
    /// The raw line, kept for the consequence scan.
    line: &'a str,
    record: vcf::Record,
    chrom: String,
    reference: String,
    alternative: String,
    rs_id: String,
    filter: String,
    header: &'a VcfHeader,
}

fn or_missing(value: String) -> String {
    if value.is_empty() {
        MISSING.to_string()
    } else {
        value
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            if value != MISSING {
                tracing::debug!("ignoring unparseable value {:?} of {}", value, key);
            }
            None
        }
    }
}

/// Text of the call field `key` of `sample`, `None` if absent or missing.
fn call_field(sample: &Sample<'_>, key: &vcf::record::genotypes::keys::Key) -> Option<String> {
    match sample.get(key) {
        Some(Some(value)) => Some(value.to_string()),
        _ => None,
    }
}

/// Like [`call_field`] for keys without a standard definition.
fn call_field_by_name(sample: &Sample<'_>, name: &str) -> Option<String> {
    let idx = sample.keys().get_index_of(name)?;
    sample
        .values()
        .get(idx)
        .and_then(|value| value.as_ref())
        .map(|value| value.to_string())
}

/// Reference and first alternative allele depth from `AD`.
fn allele_depths(sample: &Sample<'_>) -> (Option<i32>, Option<i32>) {
    match sample.get(&key::READ_DEPTHS) {
        Some(Some(Value::Array(Array::Integer(depths)))) => (
            depths.first().copied().flatten(),
            depths.get(1).copied().flatten(),
        ),
        _ => (None, None),
    }
}

impl<'a> VcfRecord<'a> {
    /// Parse `line` against `header`; fails on malformed fields.
    pub fn parse(line: &'a str, header: &'a VcfHeader) -> Result<Self, Error> {
        let line = line.trim_end_matches(['\n', '\r']);
        let record = vcf::Record::try_from((&header.inner, line))
            .map_err(|e| Error::Parse(format!("invalid record {:?}: {}", line, e)))?;
        Ok(VcfRecord {
            line,
            chrom: record.chromosome().to_string(),
            reference: record.reference_bases().to_string(),
            alternative: or_missing(record.alternate_bases().to_string()),
            rs_id: or_missing(record.ids().to_string()),
            filter: record
                .filters()
                .map(|filters| filters.to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            record,
            header,
        })
    }

    /// Text of the INFO value for `key`; flags yield an empty string.
    pub fn info(&self, key: &str) -> Option<String> {
        match self.record.info().as_ref().get(key) {
            Some(Some(value)) => Some(value.to_string()),
            _ => None,
        }
    }

    /// Whether the record describes a single nucleotide variant.
    pub fn is_snv(&self) -> bool {
        self.reference.len() == 1 && self.alternative.len() == 1 && self.alternative != MISSING
    }
}

impl RawRecord for VcfRecord<'_> {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn pos(&self) -> u64 {
        usize::from(self.record.position()) as u64
    }

    fn reference(&self) -> &str {
        &self.reference
    }

    fn alternative(&self) -> &str {
        &self.alternative
    }

    fn rs_id(&self) -> &str {
        &self.rs_id
    }

    fn quality(&self) -> Option<f64> {
        parse_number(
            "QUAL",
            self.record.quality_score().map(|score| score.to_string()),
        )
    }

    fn filter(&self) -> &str {
        &self.filter
    }

    fn end(&self) -> Option<u64> {
        parse_number("END", self.info("END"))
    }

    fn sv_type(&self) -> Option<String> {
        self.info("SVTYPE")
    }

    fn consequence_source(&self) -> ConsequenceSource<'_> {
        ConsequenceSource::Line(self.line)
    }

    fn transcripts(&self) -> Vec<Transcript> {
        match (self.info("CSQ"), self.info("ANN")) {
            (Some(raw), _) if !self.header.vep_columns.is_empty() => {
                transcripts::parse(AnnotationFormat::Vep, &raw, &self.header.vep_columns)
            }
            (_, Some(raw)) if !self.header.snpeff_columns.is_empty() => {
                transcripts::parse(AnnotationFormat::SnpEff, &raw, &self.header.snpeff_columns)
            }
            _ => Vec::new(),
        }
    }

    fn thousand_g(&self) -> Option<f64> {
        parse_number(THOUSAND_G, self.info(THOUSAND_G))
    }

    fn exac(&self) -> Option<f64> {
        EXAC_KEYS
            .iter()
            .find_map(|key| parse_number(key, self.info(key)))
    }

    fn occurrences(&self) -> Option<f64> {
        parse_number("OCC", self.info("OCC"))
    }

    fn cadd(&self) -> Option<f64> {
        parse_number("CADD", self.info("CADD"))
    }

    fn rank_score(&self) -> Option<f64> {
        self.info("RankScore")
            .and_then(|raw| scores::parse_rank_score(&raw))
    }

    fn genetic_models(&self) -> Vec<String> {
        self.info("GeneticModels")
            .map(|raw| scores::parse_genetic_models(&raw))
            .unwrap_or_default()
    }

    fn compounds(&self) -> Vec<Compound> {
        self.info("Compounds")
            .map(|raw| compounds::parse(&raw))
            .unwrap_or_default()
    }

    fn genotype(&self, individual: &Individual) -> Option<Genotype> {
        let idx = self.header.sample_index(&individual.ind_id)?;
        let sample = self.record.genotypes().get_index(idx)?;
        let (ref_depth, alt_depth) = allele_depths(&sample);
        Some(Genotype {
            genotype: call_field(&sample, &key::GENOTYPE).unwrap_or_else(|| "./.".to_string()),
            ref_depth,
            alt_depth,
            genotype_quality: parse_number(
                "GQ",
                call_field(&sample, &key::CONDITIONAL_GENOTYPE_QUALITY),
            ),
            depth: parse_number("DP", call_field(&sample, &key::READ_DEPTH)),
            supporting_evidence: parse_number("SU", call_field_by_name(&sample, "SU"))
                .unwrap_or_default(),
            pe_support: parse_number("PE", call_field_by_name(&sample, "PE")).unwrap_or_default(),
            sr_support: parse_number("SR", call_field_by_name(&sample, "SR")).unwrap_or_default(),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod test {
    use noodles_vcf as vcf;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::VcfRecord;
    use crate::{
        annotate::{ConsequenceSource, RawRecord},
        backend::vcf::header::VcfHeader,
        model::Individual,
    };

    fn header() -> VcfHeader {
        let inner: vcf::Header = "##fileformat=VCFv4.2\n\
            #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tfather\tchild\n"
            .parse()
            .unwrap();
        VcfHeader {
            sample_names: vec!["father".into(), "child".into()],
            vep_columns: ["Allele", "Consequence", "SYMBOL", "Gene", "Feature"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            inner,
            ..Default::default()
        }
    }

    const LINE: &str = "chr1\t880086\trs1\tT\tC\t50.5\tPASS\t\
        1000GAF=0.002;ExACAF=0.003;CADD=24.1;RankScore=fam:4,fam2:7;\
        GeneticModels=fam:AR_hom|AD_dn;Compounds=fam:1_880099_A_G>12|1_880100_C_T>20;\
        CSQ=C|missense_variant|SAMD11|ENSG00000187634|ENST00000342066;DB\t\
        GT:AD:GQ:DP\t0/1:10,12:99:22\t1/1:.:20:8\n";

    #[test]
    fn fixed_fields() -> Result<(), anyhow::Error> {
        let header = header();
        let record = VcfRecord::parse(LINE, &header)?;
        assert_eq!(record.chrom(), "chr1");
        assert_eq!(record.pos(), 880086);
        assert_eq!(record.rs_id(), "rs1");
        assert_eq!(record.quality(), Some(50.5));
        assert_eq!(record.filter(), "PASS");
        assert!(record.is_snv());
        assert_eq!(record.info("DB").as_deref(), Some(""));
        assert_eq!(record.info("OCC"), None);
        assert!(matches!(record.consequence_source(), ConsequenceSource::Line(_)));
        Ok(())
    }

    #[test]
    fn info_fields() -> Result<(), anyhow::Error> {
        let header = header();
        let record = VcfRecord::parse(LINE, &header)?;
        assert_eq!(record.thousand_g(), Some(0.002));
        assert_eq!(record.exac(), Some(0.003));
        assert_eq!(record.cadd(), Some(24.1));
        assert_eq!(record.rank_score(), Some(7.0));
        assert_eq!(record.genetic_models(), vec!["AR_hom", "AD_dn"]);
        assert_eq!(record.compounds().len(), 2);
        assert_eq!(record.end(), None);

        let transcripts = record.transcripts();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(transcripts[0].hgnc_symbol.as_deref(), Some("SAMD11"));
        assert_eq!(transcripts[0].consequences, vec!["missense_variant"]);
        Ok(())
    }

    #[test]
    fn genotypes() -> Result<(), anyhow::Error> {
        let header = header();
        let record = VcfRecord::parse(LINE, &header)?;

        let father = record
            .genotype(&Individual::new("father", "fam", 0, "x.vcf".into()))
            .unwrap();
        assert_eq!(father.genotype, "0/1");
        assert_eq!((father.ref_depth, father.alt_depth), (Some(10), Some(12)));
        assert_eq!(father.genotype_quality, Some(99.0));
        assert_eq!(father.depth, Some(22));
        assert_eq!(father.supporting_evidence, 0);

        let child = record
            .genotype(&Individual::new("child", "fam", 1, "x.vcf".into()))
            .unwrap();
        assert_eq!(child.genotype, "1/1");
        assert_eq!((child.ref_depth, child.alt_depth), (None, None));

        assert!(record
            .genotype(&Individual::new("mother", "fam", 2, "x.vcf".into()))
            .is_none());
        Ok(())
    }

    #[rstest]
    #[case("1\t100\t.\tA\tC\t.\tPASS")]
    #[case("1\tabc\t.\tA\tC\t.\tPASS\t.")]
    #[case("")]
    #[case("1\t100\t.\tA\tC\tbad\tPASS\t.")]
    fn malformed(#[case] line: &str) {
        let header = header();
        assert!(VcfRecord::parse(line, &header).is_err());
    }

    #[test]
    fn sv_info() -> Result<(), anyhow::Error> {
        let header = VcfHeader::default();
        let line = "1\t1000\t.\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=6000;OCC=3";
        let record = VcfRecord::parse(line, &header)?;
        assert!(!record.is_snv());
        assert_eq!(record.end(), Some(6000));
        assert_eq!(record.sv_type().as_deref(), Some("DEL"));
        assert_eq!(record.occurrences(), Some(3.0));
        assert!(record.transcripts().is_empty());
        Ok(())
    }

    #[test]
    fn typed_header_values() -> Result<(), anyhow::Error> {
        let inner: vcf::Header = "##fileformat=VCFv4.2\n\
            ##INFO=<ID=CADD,Number=1,Type=Float,Description=\"CADD PHRED\">\n\
            ##INFO=<ID=RankScore,Number=.,Type=String,Description=\"Rank score\">\n\
            ##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
            ##FORMAT=<ID=AD,Number=R,Type=Integer,Description=\"Allelic depths\">\n\
            #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tchild\n"
            .parse()?;
        let header = VcfHeader::from_noodles(&inner);
        let line = "1\t100\t.\tA\tC\t.\t.\tCADD=24.1;RankScore=fam:4,fam2:7\tGT:AD\t0/1:.,5";
        let record = VcfRecord::parse(line, &header)?;

        assert_eq!(record.cadd(), Some(24.1));
        assert_eq!(record.rank_score(), Some(7.0));
        assert_eq!(record.filter(), ".");
        assert_eq!(record.quality(), None);
        let child = record
            .genotype(&Individual::new("child", "fam", 0, "x.vcf".into()))
            .unwrap();
        assert_eq!((child.ref_depth, child.alt_depth), (None, Some(5)));

        let broken = "1\t100\t.\tA\tC\t.\t.\tCADD=high\tGT\t0/1";
        assert!(VcfRecord::parse(broken, &header).is_err());
        Ok(())
    }
}
