//! Implementation of `varsift cases`.

use std::path::PathBuf;

use clap::Parser;

use super::{write_json, SourceArgs};
use crate::{backend::Capabilities, model::Case};

/// Command line arguments for `cases` sub command.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "List the cases of variant sources", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Only list cases whose id or name contains this string.
    #[arg(long)]
    pub pattern: Option<String>,
    /// Path to the output JSON file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// A case together with what can be asked of it.
#[derive(Debug, serde::Serialize)]
pub struct CaseInfo<'a> {
    #[serde(flatten)]
    pub case: &'a Case,
    pub capabilities: Capabilities,
}

/// Main entry point for `cases` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let registry = args.source.registry()?;
    let cases = registry
        .cases(args.pattern.as_deref())
        .into_iter()
        .map(|case| CaseInfo {
            case,
            capabilities: registry.capabilities(&case.case_id).unwrap_or_default(),
        })
        .collect::<Vec<_>>();
    tracing::info!("found {} case(s)", cases.len());

    write_json(&cases, args.path_output.as_deref())
}
