//! Transcript annotation embedded by VEP (`CSQ`) or snpEff (`ANN`).

use std::collections::HashMap;

use crate::model::{Transcript, Variant};

/// Default `ANN` columns, used when the header does not describe them.
pub const SNPEFF_COLUMNS: &[&str] = &[
    "Allele",
    "Annotation",
    "Annotation_Impact",
    "Gene_Name",
    "Gene_ID",
    "Feature_Type",
    "Feature_ID",
    "Transcript_BioType",
    "Rank",
    "HGVS.c",
    "HGVS.p",
    "cDNA.pos / cDNA.length",
    "CDS.pos / CDS.length",
    "AA.pos / AA.length",
    "Distance",
    "ERRORS / WARNINGS / INFO",
];

/// Annotator that produced the embedded transcript annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AnnotationFormat {
    /// Ensembl VEP, INFO key `CSQ`.
    Vep,
    /// snpEff, INFO key `ANN`.
    SnpEff,
}

impl AnnotationFormat {
    /// INFO key carrying the annotation.
    pub fn info_key(&self) -> &'static str {
        match self {
            AnnotationFormat::Vep => "CSQ",
            AnnotationFormat::SnpEff => "ANN",
        }
    }

    /// Extract the column names from the header's INFO description.
    ///
    /// VEP writes `... Format: Allele|Consequence|...`, snpEff writes
    /// `Functional annotations: 'Allele | Annotation | ...'`.
    pub fn columns_from_description(&self, description: &str) -> Vec<String> {
        let columns = match self {
            AnnotationFormat::Vep => description.split_once("Format:").map(|(_, tail)| tail),
            AnnotationFormat::SnpEff => description.split_once(':').map(|(_, tail)| tail),
        };
        columns
            .map(|tail| {
                tail.trim()
                    .trim_matches(|c| c == '\'' || c == '"')
                    .split('|')
                    .map(|c| c.trim().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Default columns if the header lacks a usable description.
    pub fn default_columns(&self) -> Vec<String> {
        match self {
            AnnotationFormat::Vep => Vec::new(),
            AnnotationFormat::SnpEff => SNPEFF_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Map column names to the non-empty values of one `|`-separated entry.
fn zip_fields<'a, S: AsRef<str>>(columns: &'a [S], entry: &'a str) -> HashMap<&'a str, &'a str> {
    columns
        .iter()
        .map(|c| c.as_ref())
        .zip(entry.split('|'))
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

fn get(fields: &HashMap<&str, &str>, key: &str) -> Option<String> {
    fields.get(key).map(|value| value.to_string())
}

fn vep_transcript(fields: &HashMap<&str, &str>) -> Transcript {
    let mut transcript = Transcript {
        hgnc_symbol: get(fields, "SYMBOL"),
        transcript_id: get(fields, "Feature"),
        ensembl_id: get(fields, "Gene"),
        biotype: get(fields, "BIOTYPE"),
        strand: get(fields, "STRAND"),
        sift: get(fields, "SIFT"),
        polyphen: get(fields, "PolyPhen"),
        exon: get(fields, "EXON"),
        hgvs_c: get(fields, "HGVSc"),
        hgvs_p: get(fields, "HGVSp"),
        gmaf: get(fields, "GMAF"),
        exac_maf: get(fields, "ExAC_MAF"),
        ..Default::default()
    };
    if let Some(consequence) = fields.get("Consequence") {
        transcript.set_consequences(consequence);
    }
    transcript
}

fn snpeff_transcript(fields: &HashMap<&str, &str>) -> Transcript {
    let mut transcript = Transcript {
        hgnc_symbol: get(fields, "Gene_Name"),
        transcript_id: get(fields, "Feature_ID"),
        ensembl_id: get(fields, "Gene_ID"),
        biotype: get(fields, "Transcript_BioType"),
        exon: get(fields, "Rank"),
        hgvs_c: get(fields, "HGVS.c"),
        hgvs_p: get(fields, "HGVS.p"),
        ..Default::default()
    };
    if let Some(consequence) = fields.get("Annotation") {
        transcript.set_consequences(consequence);
    }
    transcript
}

/// Parse the value of a `CSQ` or `ANN` INFO field, one transcript per
/// comma-separated entry.
pub fn parse<S: AsRef<str>>(format: AnnotationFormat, raw: &str, columns: &[S]) -> Vec<Transcript> {
    raw.split(',')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let fields = zip_fields(columns, entry);
            match format {
                AnnotationFormat::Vep => vep_transcript(&fields),
                AnnotationFormat::SnpEff => snpeff_transcript(&fields),
            }
        })
        .collect()
}

/// Attach `transcripts` to `variant`.
pub fn add_transcripts(variant: &mut Variant, transcripts: Vec<Transcript>) {
    for transcript in transcripts {
        variant.add_transcript(transcript);
    }
}
