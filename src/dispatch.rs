//! Selection of the adapter serving a case.

use std::{path::Path, sync::Arc};

use crate::{
    backend::{detect_mode, gemini::GeminiAdapter, vcf::VcfAdapter, Adapter, Capabilities},
    err::Error,
    filter::{FilterSpec, VariantPage},
    lookup::{GeneListStore, Lookups},
    model::{Case, Variant, VariantMode, VariantType},
};

/// Open the adapter matching the kind of `source`.
///
/// A pedigree is only used for VCF sources.
pub fn open_adapter(
    source: &Path,
    path_ped: Option<&Path>,
    variant_type: Option<VariantType>,
    lookups: Lookups,
) -> Result<Box<dyn Adapter>, Error> {
    match detect_mode(source)? {
        VariantMode::Vcf => Ok(Box::new(VcfAdapter::new(
            source,
            path_ped,
            variant_type,
            lookups,
        )?)),
        VariantMode::Gemini => {
            if let Some(path_ped) = path_ped {
                tracing::warn!("Ignoring pedigree {:?} for query database", path_ped);
            }
            Ok(Box::new(GeminiAdapter::new(source, variant_type, lookups)?))
        }
    }
}

/// Variant sources registered under one roof.
///
/// Case ids are unique across the registry; when two sources provide the
/// same case id, the one registered first serves it.
pub struct Registry {
    adapters: Vec<Box<dyn Adapter>>,
    gene_lists: Arc<dyn GeneListStore>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("adapters", &self.adapters.len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new(gene_lists: Arc<dyn GeneListStore>) -> Self {
        Registry {
            adapters: Vec::new(),
            gene_lists,
        }
    }

    pub fn register(&mut self, adapter: Box<dyn Adapter>) {
        for case in adapter.case_list() {
            if let Some(existing) = self.adapter(&case.case_id) {
                tracing::warn!(
                    "Case {} is already served by the {} backend",
                    &case.case_id,
                    existing.mode()
                );
            }
        }
        self.adapters.push(adapter);
    }

    /// The adapter serving `case_id`.
    pub fn adapter(&self, case_id: &str) -> Option<&dyn Adapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.case(case_id).is_some())
            .map(|adapter| adapter.as_ref())
    }

    /// Cases of all sources whose id or name contains `pattern`.
    pub fn cases(&self, pattern: Option<&str>) -> Vec<&Case> {
        let mut result: Vec<&Case> = Vec::new();
        for case in self.adapters.iter().flat_map(|a| a.cases(pattern)) {
            if !result.iter().any(|c| c.case_id == case.case_id) {
                result.push(case);
            }
        }
        result
    }

    pub fn case(&self, case_id: &str) -> Option<&Case> {
        self.adapter(case_id).and_then(|adapter| adapter.case(case_id))
    }

    pub fn capabilities(&self, case_id: &str) -> Option<Capabilities> {
        let adapter = self.adapter(case_id)?;
        adapter.case(case_id).map(|case| adapter.capabilities(case))
    }

    /// One page of the variants of `case_id` after resolving the gene
    /// lists of `filter`; `None` for unknown cases.
    pub fn variants(
        &self,
        case_id: &str,
        skip: usize,
        count: usize,
        filter: &FilterSpec,
    ) -> Result<Option<VariantPage>, Error> {
        let adapter = match self.adapter(case_id) {
            Some(adapter) => adapter,
            None => {
                tracing::info!("no backend serves case {}", case_id);
                return Ok(None);
            }
        };
        let mut filter = filter.clone();
        filter.resolve_gene_lists(self.gene_lists.as_ref());
        adapter.variants(case_id, skip, count, &filter)
    }

    pub fn variant(&self, case_id: &str, variant_id: &str) -> Result<Option<Variant>, Error> {
        match self.adapter(case_id) {
            Some(adapter) => adapter.variant(case_id, variant_id),
            None => Ok(None),
        }
    }
}
