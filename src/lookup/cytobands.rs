//! Cytogenetic bands from UCSC `cytoBand.txt` files.

use std::{collections::HashMap, path::Path, time::Instant};

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;

use super::CytobandResolver;
use crate::common::{canonicalize, io::open_read_maybe_gz};

/// Alias for the interval tree that we use.
type IntervalTree = ArrayBackedIntervalTree<u64, usize>;

/// Code for reading the UCSC file.
pub mod input {
    use serde::Deserialize;

    /// One line of `cytoBand.txt`.
    #[derive(Deserialize, Debug)]
    pub struct Record {
        pub chrom: String,
        /// 0-based begin position.
        pub begin: u64,
        /// 0-based end position.
        pub end: u64,
        /// Band name, e.g., `p36.33`.
        pub name: String,
        /// Giemsa stain, unused.
        pub stain: Option<String>,
    }
}

/// Bands with an interval tree per chromosome.
#[derive(Default, Debug)]
pub struct CytobandDb {
    /// Labels such as `1p36.33`.
    pub labels: Vec<String>,
    pub trees: HashMap<String, IntervalTree>,
}

impl CytobandDb {
    /// Build from already parsed records.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = input::Record>,
    {
        let mut result = CytobandDb::default();
        for record in records {
            if record.begin >= record.end {
                continue;
            }
            let chrom = canonicalize(&record.chrom).to_string();
            let idx = result.labels.len();
            result.labels.push(format!("{}{}", &chrom, &record.name));
            result
                .trees
                .entry(chrom)
                .or_insert_with(IntervalTree::new)
                .insert(record.begin..record.end, idx);
        }
        result.trees.values_mut().for_each(|tree| tree.index());
        result
    }
}

impl CytobandResolver for CytobandDb {
    fn cytoband(&self, chrom: &str, pos: u64) -> Option<String> {
        let tree = self.trees.get(canonicalize(chrom))?;
        tree.find(pos..(pos + 1))
            .iter()
            .map(|entry| *entry.data())
            .min()
            .map(|idx| self.labels[idx].clone())
    }
}

/// Load cytobands from a (possibly gzip-compressed) UCSC file.
#[tracing::instrument]
pub fn load_cytoband_db(path: &Path) -> Result<CytobandDb, anyhow::Error> {
    tracing::debug!("loading cytoband records from {:?}...", path);

    let before_loading = Instant::now();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .delimiter(b'\t')
        .from_reader(open_read_maybe_gz(path)?);

    let mut records = Vec::new();
    for record in reader.deserialize() {
        let record: input::Record = record?;
        records.push(record);
    }
    tracing::debug!(
        "... done loading {} records in {:?}",
        records.len(),
        before_loading.elapsed(),
    );

    Ok(CytobandDb::from_records(records))
}
