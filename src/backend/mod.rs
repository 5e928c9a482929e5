//! Backend adapters and their shared contract.

use std::{collections::BTreeSet, path::Path};

use crate::{
    err::Error,
    filter::{paginate, passes, FilterSpec, Predicate, VariantPage},
    model::{Case, Individual, Variant, VariantMode, VariantType},
};

pub mod gemini;
pub mod vcf;

/// Number of records scanned when detecting the variant type of a source.
pub const TYPE_DETECTION_RECORDS: usize = 1000;

/// Lazily produced variants of one query.
pub type VariantIter<'a> = Box<dyn Iterator<Item = Result<Variant, Error>> + 'a>;

/// What an adapter can do for a case.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Capabilities {
    /// Predicates offered for the case.
    pub filterable: BTreeSet<Predicate>,
    /// Predicates evaluated by the backend itself; these are not applied
    /// again after enrichment.
    pub native: BTreeSet<Predicate>,
    /// Whether structural variant annotation is produced.
    pub structural: bool,
}

impl Capabilities {
    pub fn can_filter(&self, predicate: Predicate) -> bool {
        self.filterable.contains(&predicate)
    }
}

/// Detect the backend of a variant source from its file name.
pub fn detect_mode(path: &Path) -> Result<VariantMode, Error> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    if name.ends_with(".db") {
        Ok(VariantMode::Gemini)
    } else if name.ends_with(".vcf") || name.ends_with(".vcf.gz") || path.is_dir() {
        Ok(VariantMode::Vcf)
    } else {
        Err(Error::config(
            path,
            "unknown variant source, expected *.db, *.vcf or *.vcf.gz",
        ))
    }
}

/// Variant type from the first records of a source: `snv` if any of them
/// is a single nucleotide variant, else `sv`.
pub fn detect_variant_type<I>(is_snv: I) -> VariantType
where
    I: IntoIterator<Item = bool>,
{
    if is_snv
        .into_iter()
        .take(TYPE_DETECTION_RECORDS)
        .any(|is_snv| is_snv)
    {
        VariantType::Snv
    } else {
        VariantType::Sv
    }
}

/// Common interface of the variant backends.
///
/// The not-found conditions (unknown case, individual or variant) yield
/// `None`; errors are reserved for broken sources.
pub trait Adapter: Send + Sync {
    fn mode(&self) -> VariantMode;

    /// All cases of the adapter, in discovery order.
    fn case_list(&self) -> &[Case];

    fn capabilities(&self, case: &Case) -> Capabilities;

    /// Variants of `case` in source order, with 1-based indices and
    /// native predicates applied.
    fn candidates<'a>(&'a self, case: &'a Case, filter: &'a FilterSpec)
        -> Result<VariantIter<'a>, Error>;

    /// Single variant by id.
    fn variant(&self, case_id: &str, variant_id: &str) -> Result<Option<Variant>, Error>;

    /// Cases whose id or name contains `pattern`.
    fn cases(&self, pattern: Option<&str>) -> Vec<&Case> {
        self.case_list()
            .iter()
            .filter(|case| match pattern {
                Some(pattern) => case.case_id.contains(pattern) || case.name.contains(pattern),
                None => true,
            })
            .collect()
    }

    fn case(&self, case_id: &str) -> Option<&Case> {
        self.case_list().iter().find(|case| case.case_id == case_id)
    }

    fn individual(&self, ind_id: &str) -> Option<&Individual> {
        self.case_list()
            .iter()
            .flat_map(|case| case.individuals.iter())
            .find(|individual| individual.ind_id == ind_id)
    }

    /// The requested individuals in request order, all if `ind_ids` is
    /// `None`.
    fn individuals(&self, ind_ids: Option<&[String]>) -> Vec<&Individual> {
        let all = self
            .case_list()
            .iter()
            .flat_map(|case| case.individuals.iter());
        match ind_ids {
            Some(ind_ids) => ind_ids
                .iter()
                .flat_map(|ind_id| all.clone().filter(move |ind| &ind.ind_id == ind_id))
                .collect(),
            None => all.collect(),
        }
    }

    /// Lazily filtered variants of a case; `None` for unknown cases.
    ///
    /// Consumers that stop early stop reading the source.
    fn stream<'a>(
        &'a self,
        case_id: &str,
        filter: &'a FilterSpec,
    ) -> Result<Option<VariantIter<'a>>, Error> {
        let case = match self.case(case_id) {
            Some(case) => case,
            None => {
                tracing::info!("no case with id {}", case_id);
                return Ok(None);
            }
        };
        let native = self.capabilities(case).native;
        let candidates = self.candidates(case, filter)?;
        Ok(Some(Box::new(candidates.filter(move |variant| match variant {
            Ok(variant) => passes(variant, filter, &native),
            Err(_) => true,
        }))))
    }

    /// One page of the filtered variants of a case together with the
    /// number of all matches; `None` for unknown cases.
    fn variants(
        &self,
        case_id: &str,
        skip: usize,
        count: usize,
        filter: &FilterSpec,
    ) -> Result<Option<VariantPage>, Error> {
        tracing::info!(
            "Looking for variants in {} (skip={}, count={})",
            case_id,
            skip,
            count
        );
        match self.stream(case_id, filter)? {
            Some(stream) => Ok(Some(paginate(stream, skip, count)?)),
            None => Ok(None),
        }
    }
}
