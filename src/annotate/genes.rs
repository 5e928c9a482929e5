//! Gene symbols and gene metadata.

use std::collections::BTreeSet;

use crate::{
    lookup::{GeneIdLookup, GeneRangeResolver, GeneResolver},
    model::Variant,
};

/// Derive the gene symbols, from the transcripts if there are any, else
/// from the genes overlapping the variant.
pub fn add_gene_symbols(variant: &mut Variant, ranges: &dyn GeneRangeResolver) {
    let symbols: Vec<String> = if variant.transcripts.is_empty() {
        ranges
            .symbols_for_range(&variant.chrom, variant.start, variant.stop)
            .into_iter()
            .collect()
    } else {
        let mut symbols: Vec<String> = Vec::new();
        for symbol in variant
            .transcripts
            .iter()
            .filter_map(|tx| tx.hgnc_symbol.as_ref())
        {
            if !symbols.contains(symbol) {
                symbols.push(symbol.clone());
            }
        }
        symbols
    };
    tracing::debug!(
        "Updating gene symbols of {} to {:?}",
        &variant.variant_id,
        &symbols
    );
    variant.gene_symbols = symbols;
}

/// Resolve and attach gene metadata.
///
/// Uses the transcripts' ENSEMBL ids and symbols if there are transcripts,
/// else the gene symbols.  Must run after [`add_gene_symbols`].
pub fn add_genes(variant: &mut Variant, resolver: &dyn GeneResolver) {
    let (ensembl_ids, hgnc_symbols): (BTreeSet<String>, BTreeSet<String>) =
        if variant.transcripts.is_empty() {
            (BTreeSet::new(), variant.gene_symbols.iter().cloned().collect())
        } else {
            (
                variant
                    .transcripts
                    .iter()
                    .filter_map(|tx| tx.ensembl_id.clone())
                    .collect(),
                variant
                    .transcripts
                    .iter()
                    .filter_map(|tx| tx.hgnc_symbol.clone())
                    .collect(),
            )
        };
    if ensembl_ids.is_empty() && hgnc_symbols.is_empty() {
        return;
    }
    for gene in resolver.resolve(&ensembl_ids, &hgnc_symbols) {
        variant.add_gene(gene);
    }
}

/// Fill in missing ENSEMBL ids of the transcripts and missing OMIM numbers
/// and ENSEMBL ids of the genes from their symbols.
pub fn add_gene_ids(variant: &mut Variant, ids: &dyn GeneIdLookup) {
    for tx in variant.transcripts.iter_mut() {
        if tx.ensembl_id.is_none() {
            tx.ensembl_id = tx.hgnc_symbol.as_deref().and_then(|s| ids.ensembl_id(s));
        }
    }
    for gene in variant.genes.iter_mut() {
        if gene.omim_number.is_none() {
            gene.omim_number = ids.omim(&gene.symbol);
        }
        if gene.ensembl_id.is_none() {
            gene.ensembl_id = ids.ensembl_id(&gene.symbol);
        }
    }
}
