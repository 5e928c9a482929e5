//! Gene metadata loaded from a TSV file.

use std::{collections::BTreeSet, collections::HashMap, path::Path, time::Instant};

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;
use serde::Deserialize;

use super::{GeneIdLookup, GeneRangeResolver, GeneResolver};
use crate::{common::io::open_read_maybe_gz, model::Gene};

/// Alias for the interval tree that we use.
type IntervalTree = ArrayBackedIntervalTree<u64, usize>;

/// One line of the gene TSV file.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct GeneRecord {
    /// HGNC gene symbol.
    pub symbol: String,
    pub ensembl_id: Option<String>,
    pub omim_number: Option<u32>,
    pub hgnc_id: Option<String>,
    pub chrom: Option<String>,
    /// 1-based start position.
    pub start: Option<u64>,
    /// 1-based end position, inclusive.
    pub stop: Option<u64>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub hi_score: Option<f64>,
    pub constraint_score: Option<f64>,
    pub morbid: Option<bool>,
}

impl From<&GeneRecord> for Gene {
    fn from(record: &GeneRecord) -> Self {
        Gene {
            symbol: record.symbol.clone(),
            omim_number: record.omim_number,
            ensembl_id: record.ensembl_id.clone(),
            description: record.description.clone(),
            chrom: record.chrom.clone(),
            start: record.start,
            stop: record.stop,
            location: record.location.clone(),
            hi_score: record.hi_score,
            constraint_score: record.constraint_score,
            hgnc_id: record.hgnc_id.clone(),
            morbid: record.morbid,
        }
    }
}

/// Gene records with lookup by symbol, ENSEMBL id and position.
#[derive(Default, Debug)]
pub struct GeneDb {
    pub records: Vec<GeneRecord>,
    /// Link from symbol to indices in records.
    pub from_symbol: multimap::MultiMap<String, usize>,
    /// Link from ENSEMBL gene id to indices in records.
    pub from_ensembl: multimap::MultiMap<String, usize>,
    /// Interval trees by canonical chromosome name.
    pub trees: HashMap<String, IntervalTree>,
}

impl GeneDb {
    /// Build from records.
    pub fn from_records(records: Vec<GeneRecord>) -> Self {
        let mut result = GeneDb::default();
        for (idx, record) in records.iter().enumerate() {
            result.from_symbol.insert(record.symbol.clone(), idx);
            if let Some(ensembl_id) = &record.ensembl_id {
                result.from_ensembl.insert(ensembl_id.clone(), idx);
            }
            if let (Some(chrom), Some(start), Some(stop)) = (&record.chrom, record.start, record.stop)
            {
                if start <= stop {
                    let chrom = crate::common::canonicalize(chrom).to_string();
                    result
                        .trees
                        .entry(chrom)
                        .or_insert_with(IntervalTree::new)
                        .insert(start.saturating_sub(1)..stop, idx);
                }
            }
        }
        result.trees.values_mut().for_each(|tree| tree.index());
        result.records = records;
        result
    }

    fn by_symbol(&self, symbol: &str) -> impl Iterator<Item = &GeneRecord> {
        self.from_symbol
            .get_vec(symbol)
            .into_iter()
            .flatten()
            .map(|idx| &self.records[*idx])
    }

    fn by_ensembl(&self, ensembl_id: &str) -> impl Iterator<Item = &GeneRecord> {
        self.from_ensembl
            .get_vec(ensembl_id)
            .into_iter()
            .flatten()
            .map(|idx| &self.records[*idx])
    }
}

impl GeneResolver for GeneDb {
    fn resolve(
        &self,
        ensembl_ids: &BTreeSet<String>,
        hgnc_symbols: &BTreeSet<String>,
    ) -> Vec<Gene> {
        let records: Vec<&GeneRecord> = if !ensembl_ids.is_empty() {
            ensembl_ids.iter().flat_map(|id| self.by_ensembl(id)).collect()
        } else {
            hgnc_symbols.iter().flat_map(|s| self.by_symbol(s)).collect()
        };

        let mut seen = BTreeSet::new();
        records
            .into_iter()
            .filter(|record| seen.insert(record.symbol.clone()))
            .map(Gene::from)
            .collect()
    }
}

impl GeneRangeResolver for GeneDb {
    fn symbols_for_range(&self, chrom: &str, start: u64, stop: u64) -> BTreeSet<String> {
        let chrom = crate::common::canonicalize(chrom);
        let Some(tree) = self.trees.get(chrom) else {
            return BTreeSet::new();
        };
        let begin = start.saturating_sub(1);
        let end = std::cmp::max(stop, begin + 1);
        tree.find(begin..end)
            .iter()
            .map(|entry| self.records[*entry.data()].symbol.clone())
            .collect()
    }
}

impl GeneIdLookup for GeneDb {
    fn omim(&self, symbol: &str) -> Option<u32> {
        self.by_symbol(symbol).find_map(|record| record.omim_number)
    }

    fn ensembl_id(&self, symbol: &str) -> Option<String> {
        self.by_symbol(symbol)
            .find_map(|record| record.ensembl_id.clone())
    }
}

/// Load the gene database from a header-carrying TSV file.
#[tracing::instrument]
pub fn load_gene_db(path: &Path) -> Result<GeneDb, anyhow::Error> {
    tracing::debug!("loading gene TSV records from {:?}...", path);

    let before_loading = Instant::now();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_reader(open_read_maybe_gz(path)?);

    let mut records = Vec::new();
    for record in reader.deserialize() {
        let record: GeneRecord = record?;
        records.push(record);
    }
    tracing::debug!(
        "... done loading {} records in {:?}",
        records.len(),
        before_loading.elapsed(),
    );

    Ok(GeneDb::from_records(records))
}
