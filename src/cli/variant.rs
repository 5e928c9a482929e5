//! Implementation of `varsift variant`.

use std::path::PathBuf;

use clap::Parser;

use super::{write_json, SourceArgs};

/// Command line arguments for `variant` sub command.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Show a single variant of a case", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Id of the case.
    #[arg(long)]
    pub case_id: String,
    /// Id of the variant within the case.
    #[arg(long)]
    pub variant_id: String,
    /// Path to the output JSON file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// Main entry point for `variant` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let registry = args.source.registry()?;
    let variant = registry
        .variant(&args.case_id, &args.variant_id)?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no variant {} in case {}",
                &args.variant_id,
                &args.case_id
            )
        })?;

    write_json(&variant, args.path_output.as_deref())
}
