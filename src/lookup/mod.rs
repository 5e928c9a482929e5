//! Narrow interfaces to external reference data.
//!
//! Adapters receive one [`Lookups`] bundle at construction time.  The
//! services are immutable and shared by reference; the file-backed
//! implementations live in the submodules.

use std::{collections::BTreeSet, fmt, sync::Arc};

use crate::model::Gene;

pub mod cytobands;
pub mod gene_lists;
pub mod genes;

pub use cytobands::CytobandDb;
pub use gene_lists::GeneLists;
pub use genes::GeneDb;

/// Resolve gene identifiers to gene metadata.
pub trait GeneResolver: Send + Sync {
    /// Resolve by ENSEMBL ids if any are given, else by HGNC symbols.
    fn resolve(&self, ensembl_ids: &BTreeSet<String>, hgnc_symbols: &BTreeSet<String>)
        -> Vec<Gene>;
}

/// Find the genes overlapping a genomic range.
pub trait GeneRangeResolver: Send + Sync {
    fn symbols_for_range(&self, chrom: &str, start: u64, stop: u64) -> BTreeSet<String>;
}

/// Map a genomic position to its cytogenetic band.
pub trait CytobandResolver: Send + Sync {
    /// Returns `None` when no band covers the position.
    fn cytoband(&self, chrom: &str, pos: u64) -> Option<String>;
}

/// Identifier cross-references for a gene symbol.
pub trait GeneIdLookup: Send + Sync {
    fn omim(&self, symbol: &str) -> Option<u32>;
    fn ensembl_id(&self, symbol: &str) -> Option<String>;
}

/// Membership of user-defined gene lists.
pub trait GeneListStore: Send + Sync {
    /// Symbols of the list; empty for unknown lists.
    fn members(&self, list_id: &str) -> BTreeSet<String>;
}

/// Stand-in used when no reference data is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl GeneResolver for NoLookup {
    fn resolve(&self, _: &BTreeSet<String>, _: &BTreeSet<String>) -> Vec<Gene> {
        Vec::new()
    }
}

impl GeneRangeResolver for NoLookup {
    fn symbols_for_range(&self, _: &str, _: u64, _: u64) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

impl CytobandResolver for NoLookup {
    fn cytoband(&self, _: &str, _: u64) -> Option<String> {
        None
    }
}

impl GeneIdLookup for NoLookup {
    fn omim(&self, _: &str) -> Option<u32> {
        None
    }

    fn ensembl_id(&self, _: &str) -> Option<String> {
        None
    }
}

impl GeneListStore for NoLookup {
    fn members(&self, _: &str) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

/// The reference data services used during enrichment.
#[derive(Clone)]
pub struct Lookups {
    pub genes: Arc<dyn GeneResolver>,
    pub gene_ranges: Arc<dyn GeneRangeResolver>,
    pub gene_ids: Arc<dyn GeneIdLookup>,
    pub cytobands: Arc<dyn CytobandResolver>,
}

impl Default for Lookups {
    fn default() -> Self {
        Lookups {
            genes: Arc::new(NoLookup),
            gene_ranges: Arc::new(NoLookup),
            gene_ids: Arc::new(NoLookup),
            cytobands: Arc::new(NoLookup),
        }
    }
}

impl fmt::Debug for Lookups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookups").finish_non_exhaustive()
    }
}

impl Lookups {
    /// Use a gene database for all gene lookups and a cytoband database.
    pub fn new(genes: Arc<GeneDb>, cytobands: Arc<dyn CytobandResolver>) -> Self {
        Lookups {
            genes: genes.clone(),
            gene_ranges: genes.clone(),
            gene_ids: genes,
            cytobands,
        }
    }
}
