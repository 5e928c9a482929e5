//! Implementation of `varsift variants`.

use std::path::{Path, PathBuf};

use clap::Parser;

use super::{write_json, SourceArgs};
use crate::filter::FilterSpec;

/// Command line arguments for `variants` sub command.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Filter and page through the variants of a case", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Id of the case to query.
    #[arg(long)]
    pub case_id: String,
    /// Number of matching variants to skip.
    #[arg(long, default_value_t = 0)]
    pub skip: usize,
    /// Maximal number of variants to return.
    #[arg(long, default_value_t = 1000)]
    pub count: usize,
    /// Path to the filter JSON file, no filter if omitted.
    #[arg(long)]
    pub path_filter_json: Option<PathBuf>,
    /// Path to the output JSON file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// Load the filter from `path`.
fn load_filter(path: &Path) -> Result<FilterSpec, anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("could not read filter file {:?}: {}", path, e))?;
    FilterSpec::from_json(&text)
        .map_err(|e| anyhow::anyhow!("could not parse filter file {:?}: {}", path, e))
}

/// Main entry point for `variants` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let filter = match &args.path_filter_json {
        Some(path) => load_filter(path)?,
        None => FilterSpec::default(),
    };
    tracing::info!("filter = {:?}", &filter);

    let registry = args.source.registry()?;
    let page = registry
        .variants(&args.case_id, args.skip, args.count, &filter)?
        .ok_or_else(|| anyhow::anyhow!("no case with id {}", &args.case_id))?;
    tracing::info!(
        "returning {} of {} matching variants",
        page.variants.len(),
        page.total
    );
    write_json(&page, args.path_output.as_deref())?;

    tracing::info!(
        "All of `variants` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
