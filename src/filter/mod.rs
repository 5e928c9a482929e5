//! Filter specification, predicates and pagination.

use std::collections::BTreeSet;

use serde_with::{DisplayFromStr, NoneAsEmptyString, PickFirst};

use crate::{lookup::GeneListStore, model::ImpactSeverity};

pub mod paginate;
pub mod predicates;

pub use paginate::{paginate, VariantPage};
pub use predicates::passes;

/// Filter predicates, used to negotiate which of them a backend evaluates
/// natively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Predicate {
    /// Any overlap with the gene ids.
    Gene,
    /// Population frequency ceiling.
    Frequency,
    /// CADD score floor.
    Cadd,
    /// Any overlap with the consequence terms.
    Consequence,
    ImpactSeverity,
    /// Structural variant length floor.
    SvLen,
    SvType,
    /// Any overlap with the matched inheritance models.
    GeneticModel,
    /// Containment in a genomic range.
    Range,
}

/// Genomic range given as 1-based, inclusive coordinates.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Range {
    pub chromosome: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub start: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub end: u64,
}

/// Caller-supplied filter.
///
/// All keys are optional; absent, empty and zero values mean "no
/// constraint".  Numbers may also be given as strings.
#[serde_with::serde_as]
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub gene_ids: Vec<String>,
    /// Maximal population frequency.
    #[serde_as(as = "PickFirst<(Option<_>, NoneAsEmptyString)>")]
    pub frequency: Option<f64>,
    /// Minimal CADD score.
    #[serde_as(as = "PickFirst<(Option<_>, NoneAsEmptyString)>")]
    pub cadd: Option<f64>,
    pub consequence: Vec<String>,
    pub impact_severities: Vec<ImpactSeverity>,
    pub genetic_models: Vec<String>,
    /// Minimal structural variant length.
    #[serde_as(as = "PickFirst<(Option<_>, NoneAsEmptyString)>")]
    pub sv_len: Option<f64>,
    pub sv_types: Vec<String>,
    pub range: Option<Range>,
    /// Backend query replacing the default variant query of the database
    /// backend.
    pub gemini_query: Option<String>,
    /// Gene list ids, resolved into `gene_ids`.
    pub gene_lists: Vec<String>,
}

fn non_empty(values: &[String]) -> BTreeSet<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

impl FilterSpec {
    /// Parse from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn gene_ids(&self) -> BTreeSet<&str> {
        non_empty(&self.gene_ids)
    }

    pub fn frequency(&self) -> Option<f64> {
        non_zero(self.frequency)
    }

    pub fn cadd(&self) -> Option<f64> {
        non_zero(self.cadd)
    }

    pub fn consequences(&self) -> BTreeSet<&str> {
        non_empty(&self.consequence)
    }

    pub fn impact_severities(&self) -> BTreeSet<ImpactSeverity> {
        self.impact_severities.iter().copied().collect()
    }

    pub fn genetic_models(&self) -> BTreeSet<&str> {
        non_empty(&self.genetic_models)
    }

    pub fn sv_len(&self) -> Option<f64> {
        non_zero(self.sv_len)
    }

    pub fn sv_types(&self) -> BTreeSet<&str> {
        non_empty(&self.sv_types)
    }

    pub fn range(&self) -> Option<&Range> {
        self.range
            .as_ref()
            .filter(|range| !range.chromosome.trim().is_empty())
    }

    pub fn gemini_query(&self) -> Option<&str> {
        self.gemini_query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
    }

    /// Whether `predicate` constrains anything.
    pub fn is_active(&self, predicate: Predicate) -> bool {
        match predicate {
            Predicate::Gene => !self.gene_ids().is_empty(),
            Predicate::Frequency => self.frequency().is_some(),
            Predicate::Cadd => self.cadd().is_some(),
            Predicate::Consequence => !self.consequences().is_empty(),
            Predicate::ImpactSeverity => !self.impact_severities.is_empty(),
            Predicate::SvLen => self.sv_len().is_some(),
            Predicate::SvType => !self.sv_types().is_empty(),
            Predicate::GeneticModel => !self.genetic_models().is_empty(),
            Predicate::Range => self.range().is_some(),
        }
    }

    /// Whether no predicate is active.
    pub fn is_empty(&self) -> bool {
        use strum::IntoEnumIterator;
        Predicate::iter().all(|predicate| !self.is_active(predicate))
    }

    /// Union the members of the requested gene lists into `gene_ids`.
    pub fn resolve_gene_lists(&mut self, store: &dyn GeneListStore) {
        for list_id in std::mem::take(&mut self.gene_lists) {
            let members = store.members(&list_id);
            tracing::debug!("gene list {} resolves to {} symbols", &list_id, members.len());
            for symbol in members {
                if !self.gene_ids.contains(&symbol) {
                    self.gene_ids.push(symbol);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{FilterSpec, Predicate};
    use crate::{lookup::GeneLists, model::ImpactSeverity};

    #[test]
    fn empty_json_matches_all() -> Result<(), anyhow::Error> {
        let filter = FilterSpec::from_json("{}")?;
        assert!(filter.is_empty());
        assert_eq!(filter, FilterSpec::default());
        Ok(())
    }

    #[test]
    fn numbers_as_strings() -> Result<(), anyhow::Error> {
        let filter = FilterSpec::from_json(
            r#"{
                "frequency": "0.01",
                "cadd": 20,
                "sv_len": "",
                "range": {"chromosome": "1", "start": "92498060", "end": 92498100},
                "impact_severities": ["HIGH", "MED"]
            }"#,
        )?;
        assert_eq!(filter.frequency(), Some(0.01));
        assert_eq!(filter.cadd(), Some(20.0));
        assert_eq!(filter.sv_len(), None);
        let range = filter.range().unwrap();
        assert_eq!((range.start, range.end), (92498060, 92498100));
        assert_eq!(
            filter.impact_severities,
            vec![ImpactSeverity::High, ImpactSeverity::Medium]
        );
        Ok(())
    }

    #[test]
    fn falsy_values_are_inactive() -> Result<(), anyhow::Error> {
        let filter = FilterSpec::from_json(
            r#"{
                "gene_ids": [" ", ""],
                "frequency": 0,
                "consequence": [],
                "range": {"chromosome": "", "start": 1, "end": 2},
                "gemini_query": "  "
            }"#,
        )?;
        assert!(filter.is_empty());
        assert!(!filter.is_active(Predicate::Gene));
        assert_eq!(filter.gemini_query(), None);
        Ok(())
    }

    #[test]
    fn resolve_gene_lists() {
        let mut lists = GeneLists::default();
        lists.add("ribosome", "RPL5");
        lists.add("ribosome", "RPL11");
        let mut filter = FilterSpec {
            gene_ids: vec!["RPL5".into(), "GLMN".into()],
            gene_lists: vec!["ribosome".into(), "unknown".into()],
            ..Default::default()
        };
        filter.resolve_gene_lists(&lists);
        assert_eq!(filter.gene_ids, vec!["RPL5", "GLMN", "RPL11"]);
        assert!(filter.gene_lists.is_empty());
    }

    #[test]
    fn predicate_names() {
        assert_eq!(Predicate::ImpactSeverity.to_string(), "impact_severity");
        assert_eq!(Predicate::SvLen.to_string(), "sv_len");
    }
}
