//! Command line sub commands.

pub mod cases;
pub mod variant;
pub mod variants;

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    dispatch::{open_adapter, Registry},
    lookup::{
        cytobands::load_cytoband_db, gene_lists::load_gene_lists, genes::load_gene_db,
        GeneListStore, Lookups, NoLookup,
    },
    model::VariantType,
};

/// Variant sources and reference data shared by all sub commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Variant source: `*.vcf(.gz)` file, directory with such files or
    /// `*.db` query database; may be given more than once.
    #[arg(long = "source", required = true)]
    pub sources: Vec<PathBuf>,
    /// PED file with the family of a single VCF file.
    #[arg(long)]
    pub ped: Option<PathBuf>,
    /// Variant type of the sources, detected from the records if omitted.
    #[arg(long, value_enum)]
    pub variant_type: Option<VariantType>,
    /// Gene TSV file.
    #[arg(long)]
    pub path_genes: Option<PathBuf>,
    /// UCSC `cytoBand.txt(.gz)` file.
    #[arg(long)]
    pub path_cytobands: Option<PathBuf>,
    /// Gene list TSV file.
    #[arg(long)]
    pub path_gene_lists: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the configured reference data; missing files mean no lookups.
    pub fn lookups(&self) -> Result<Lookups, anyhow::Error> {
        let mut lookups = Lookups::default();
        if let Some(path) = &self.path_genes {
            tracing::info!("loading genes from {:?}...", path);
            let genes = Arc::new(load_gene_db(path)?);
            lookups.genes = genes.clone();
            lookups.gene_ranges = genes;
        }
        if let Some(path) = &self.path_cytobands {
            tracing::info!("loading cytobands from {:?}...", path);
            lookups.cytobands = Arc::new(load_cytoband_db(path)?);
        }
        Ok(lookups)
    }

    /// Open all sources and register them.
    pub fn registry(&self) -> Result<Registry, anyhow::Error> {
        let gene_lists: Arc<dyn GeneListStore> = match &self.path_gene_lists {
            Some(path) => Arc::new(load_gene_lists(path)?),
            None => Arc::new(NoLookup),
        };
        let lookups = self.lookups()?;

        let mut registry = Registry::new(gene_lists);
        for source in &self.sources {
            tracing::info!("opening variant source {:?}...", source);
            registry.register(open_adapter(
                source,
                self.ped.as_deref(),
                self.variant_type,
                lookups.clone(),
            )?);
        }
        Ok(registry)
    }
}

/// Write `value` as JSON to `path_output`, or to stdout if not given.
pub fn write_json<T: serde::Serialize>(
    value: &T,
    path_output: Option<&Path>,
) -> Result<(), anyhow::Error> {
    let mut writer: Box<dyn Write> = match path_output {
        Some(path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path)
                .map_err(|e| anyhow::anyhow!("could not create output file {:?}: {}", path, e))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
