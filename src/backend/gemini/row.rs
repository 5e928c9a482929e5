//! Rows of the `variants` table as raw records.

use rusqlite::{
    types::{Type, Value},
    Connection, Row,
};

use crate::{
    annotate::{ConsequenceSource, RawRecord},
    common::GenotypeClass,
    model::{Case, Compound, Genotype, Individual, Transcript},
};

/// Value of column `name` as text; `None` for NULL and for columns the
/// query does not select.
pub(super) fn text(row: &Row, name: &str) -> rusqlite::Result<Option<String>> {
    match row.get::<_, Value>(name) {
        Ok(Value::Text(value)) => Ok(Some(value)),
        Ok(Value::Integer(value)) => Ok(Some(value.to_string())),
        Ok(Value::Real(value)) => Ok(Some(value.to_string())),
        Ok(Value::Null) | Ok(Value::Blob(_)) => Ok(None),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn number(row: &Row, name: &str) -> rusqlite::Result<Option<f64>> {
    match row.get::<_, Value>(name) {
        Ok(Value::Integer(value)) => Ok(Some(value as f64)),
        Ok(Value::Real(value)) => Ok(Some(value)),
        Ok(Value::Text(value)) => Ok(value.trim().parse().ok()),
        Ok(Value::Null) | Ok(Value::Blob(_)) => Ok(None),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Per-sample values stored as a JSON array.
fn json_array<T: serde::de::DeserializeOwned>(row: &Row, name: &str) -> rusqlite::Result<Vec<T>> {
    match text(row, name)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| {
            let idx = row.as_ref().column_index(name).unwrap_or_default();
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        }),
        None => Ok(Vec::new()),
    }
}

/// Per-sample numbers use negative values for "unknown".
fn known<T: Copy + PartialOrd + Default>(values: &[T], idx: usize) -> Option<T> {
    values.get(idx).copied().filter(|v| *v >= T::default())
}

/// Falsy database values count as absent.
fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// One row of the `variants` table with its per-sample arrays decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeminiRow {
    pub variant_id: i64,
    pub chrom: String,
    pub start: u64,
    pub end: Option<u64>,
    pub rs_ids: Option<String>,
    pub reference: String,
    pub alternative: String,
    pub qual: Option<f64>,
    pub filter: Option<String>,
    /// `snp`, `indel` or `sv`.
    pub variant_type: Option<String>,
    pub sub_type: Option<String>,
    pub gene: Option<String>,
    pub impact_so: Option<String>,
    pub impact_severity: Option<String>,
    pub max_aaf_all: Option<f64>,
    pub aaf_1kg_all: Option<f64>,
    pub aaf_exac_all: Option<f64>,
    pub cadd_scaled: Option<f64>,
    pub polyphen_pred: Option<String>,
    pub sift_pred: Option<String>,
    pub gts: Vec<String>,
    /// Genotype classes: 0 hom. ref., 1 het., 2 unknown, 3 hom. alt.
    pub gt_types: Vec<i64>,
    pub gt_ref_depths: Vec<i64>,
    pub gt_alt_depths: Vec<i64>,
    pub gt_depths: Vec<i64>,
    pub gt_quals: Vec<f64>,
    /// Filled from `variant_impacts`.
    pub transcripts: Vec<Transcript>,
    /// Filled by the inheritance model evaluation.
    pub genetic_models: Vec<String>,
    pub compounds: Vec<Compound>,
}

impl GeminiRow {
    /// Decode the current row of a `variants` query.
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(GeminiRow {
            variant_id: row.get("variant_id")?,
            chrom: text(row, "chrom")?.unwrap_or_default(),
            start: row.get::<_, i64>("start")?.max(0) as u64,
            end: number(row, "end")?.map(|end| end.max(0.0) as u64),
            rs_ids: text(row, "rs_ids")?,
            reference: text(row, "ref")?.unwrap_or_default(),
            alternative: text(row, "alt")?.unwrap_or_default(),
            qual: number(row, "qual")?,
            filter: text(row, "filter")?,
            variant_type: text(row, "type")?,
            sub_type: text(row, "sub_type")?,
            gene: text(row, "gene")?,
            impact_so: text(row, "impact_so")?,
            impact_severity: text(row, "impact_severity")?,
            max_aaf_all: number(row, "max_aaf_all")?,
            aaf_1kg_all: number(row, "aaf_1kg_all")?,
            aaf_exac_all: number(row, "aaf_exac_all")?,
            cadd_scaled: number(row, "cadd_scaled")?,
            polyphen_pred: text(row, "polyphen_pred")?,
            sift_pred: text(row, "sift_pred")?,
            gts: json_array(row, "gts")?,
            gt_types: json_array(row, "gt_types")?,
            gt_ref_depths: json_array(row, "gt_ref_depths")?,
            gt_alt_depths: json_array(row, "gt_alt_depths")?,
            gt_depths: json_array(row, "gt_depths")?,
            gt_quals: json_array(row, "gt_quals")?,
            ..Default::default()
        })
    }

    /// Load the transcripts of this row from `variant_impacts`.
    pub fn load_transcripts(&mut self, conn: &Connection) -> rusqlite::Result<()> {
        let mut stmt =
            conn.prepare_cached("SELECT * FROM variant_impacts WHERE variant_id = ?1")?;
        let mut rows = stmt.query([self.variant_id])?;
        while let Some(row) = rows.next()? {
            let mut transcript = Transcript {
                hgnc_symbol: text(row, "gene")?,
                transcript_id: text(row, "transcript")?,
                biotype: text(row, "biotype")?,
                polyphen: text(row, "polyphen_pred")?,
                sift: text(row, "sift_pred")?,
                exon: text(row, "exon")?,
                hgvs_c: text(row, "codon_change")?,
                hgvs_p: Some(format!(
                    "{}, {}",
                    text(row, "aa_change")?.unwrap_or_default(),
                    text(row, "aa_length")?.unwrap_or_default()
                )),
                ..Default::default()
            };
            transcript.set_consequences(&text(row, "impact_so")?.unwrap_or_default());
            self.transcripts.push(transcript);
        }
        Ok(())
    }

    /// Genotype class of `individual` in this row.
    pub fn genotype_class(&self, individual: &Individual) -> GenotypeClass {
        match self.gt_types.get(individual.ind_index) {
            Some(0) => GenotypeClass::HomRef,
            Some(1) => GenotypeClass::Het,
            Some(3) => GenotypeClass::HomAlt,
            _ => GenotypeClass::Unknown,
        }
    }

    /// Whether any individual of `case` carries the alternate allele.
    pub fn is_variant(&self, case: &Case) -> bool {
        case.individuals
            .iter()
            .any(|individual| self.genotype_class(individual).is_variant())
    }
}

impl RawRecord for GeminiRow {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn pos(&self) -> u64 {
        self.start
    }

    fn reference(&self) -> &str {
        &self.reference
    }

    fn alternative(&self) -> &str {
        &self.alternative
    }

    fn rs_id(&self) -> &str {
        self.rs_ids.as_deref().unwrap_or(".")
    }

    fn quality(&self) -> Option<f64> {
        self.qual
    }

    fn filter(&self) -> &str {
        self.filter.as_deref().unwrap_or(".")
    }

    fn native_id(&self) -> Option<String> {
        Some(self.variant_id.to_string())
    }

    fn end(&self) -> Option<u64> {
        self.end
    }

    fn sv_type(&self) -> Option<String> {
        self.sub_type.clone()
    }

    fn consequence_source(&self) -> ConsequenceSource<'_> {
        ConsequenceSource::Transcripts
    }

    fn most_severe_consequence(&self) -> Option<String> {
        self.impact_so.clone()
    }

    fn impact_severity(&self) -> Option<String> {
        self.impact_severity.clone()
    }

    fn transcripts(&self) -> Vec<Transcript> {
        self.transcripts.clone()
    }

    fn thousand_g(&self) -> Option<f64> {
        non_zero(self.aaf_1kg_all)
    }

    fn exac(&self) -> Option<f64> {
        non_zero(self.aaf_exac_all)
    }

    fn max_freq(&self) -> Option<f64> {
        non_zero(self.max_aaf_all)
    }

    fn cadd(&self) -> Option<f64> {
        non_zero(self.cadd_scaled)
    }

    fn genetic_models(&self) -> Vec<String> {
        self.genetic_models.clone()
    }

    fn compounds(&self) -> Vec<Compound> {
        self.compounds.clone()
    }

    fn severities(&self) -> Vec<(String, String)> {
        [("Polyphen", &self.polyphen_pred), ("SIFT", &self.sift_pred)]
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_ref()
                    .filter(|value| !value.is_empty())
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect()
    }

    fn genotype(&self, individual: &Individual) -> Option<Genotype> {
        let idx = individual.ind_index;
        let genotype = self.gts.get(idx)?;
        Some(Genotype {
            genotype: genotype.clone(),
            ref_depth: known(&self.gt_ref_depths, idx).map(|v| v as i32),
            alt_depth: known(&self.gt_alt_depths, idx).map(|v| v as i32),
            depth: known(&self.gt_depths, idx).map(|v| v as i32),
            genotype_quality: known(&self.gt_quals, idx).map(|v| v as f32),
            ..Default::default()
        })
    }
}
