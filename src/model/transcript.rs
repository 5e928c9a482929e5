//! Per-feature consequence annotation.

/// One transcript/feature level annotation row of a variant.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transcript {
    pub hgnc_symbol: Option<String>,
    pub transcript_id: Option<String>,
    /// ENSEMBL gene id.
    pub ensembl_id: Option<String>,
    pub biotype: Option<String>,
    /// Sequence Ontology terms, deduplicated, in source order.
    pub consequences: Vec<String>,
    pub strand: Option<String>,
    pub sift: Option<String>,
    pub polyphen: Option<String>,
    pub exon: Option<String>,
    pub hgvs_c: Option<String>,
    pub hgvs_p: Option<String>,
    /// Global minor allele frequency as embedded by the annotator.
    pub gmaf: Option<String>,
    /// ExAC minor allele frequency as embedded by the annotator.
    pub exac_maf: Option<String>,
}

impl Transcript {
    /// Set consequences from an `&`-joined source value, e.g.,
    /// `"missense_variant&splice_region_variant"`.
    pub fn set_consequences(&mut self, raw: &str) {
        self.consequences.clear();
        for term in raw.split('&').map(str::trim).filter(|t| !t.is_empty()) {
            if !self.consequences.iter().any(|c| c == term) {
                self.consequences.push(term.to_string());
            }
        }
    }
}
