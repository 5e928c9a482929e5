//! Resolved gene metadata.

/// Gene information as returned by the gene metadata resolver.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Gene {
    pub symbol: String,
    pub omim_number: Option<u32>,
    pub ensembl_id: Option<String>,
    pub description: Option<String>,
    pub chrom: Option<String>,
    pub start: Option<u64>,
    pub stop: Option<u64>,
    /// Cytoband of the gene start.
    pub location: Option<String>,
    /// Haploinsufficiency score.
    pub hi_score: Option<f64>,
    pub constraint_score: Option<f64>,
    pub hgnc_id: Option<String>,
    /// Whether the gene is associated with disease, unknown if `None`.
    pub morbid: Option<bool>,
}

impl Gene {
    pub fn new(symbol: &str) -> Self {
        Gene {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }
}
