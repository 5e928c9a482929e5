//! User-defined gene lists.

use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

use serde::Deserialize;

use super::GeneListStore;
use crate::common::io::open_read_maybe_gz;

/// One `list_id`/`symbol` pair of the gene list TSV.
#[derive(Deserialize, Debug)]
struct Record {
    list_id: String,
    symbol: String,
}

/// Gene lists held in memory.
#[derive(Default, Debug, Clone)]
pub struct GeneLists {
    lists: HashMap<String, BTreeSet<String>>,
}

impl GeneLists {
    /// Add `symbol` to the list `list_id`, creating the list as needed.
    pub fn add(&mut self, list_id: &str, symbol: &str) {
        self.lists
            .entry(list_id.to_string())
            .or_default()
            .insert(symbol.to_string());
    }
}

impl GeneListStore for GeneLists {
    fn members(&self, list_id: &str) -> BTreeSet<String> {
        self.lists.get(list_id).cloned().unwrap_or_default()
    }
}

/// Load gene lists from a TSV file with `list_id` and `symbol` columns.
#[tracing::instrument]
pub fn load_gene_lists(path: &Path) -> Result<GeneLists, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_reader(open_read_maybe_gz(path)?);

    let mut result = GeneLists::default();
    for record in reader.deserialize() {
        let record: Record = record?;
        result.add(&record.list_id, &record.symbol);
    }
    tracing::debug!("loaded {} gene lists from {:?}", result.lists.len(), path);

    Ok(result)
}
