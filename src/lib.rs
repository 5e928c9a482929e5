//! Inspection of case variants stored in VCF files or query databases.
//!
//! Variants of either source are normalized into one [`model::Variant`],
//! annotated from reference data, filtered and paged.

pub mod annotate;
pub mod backend;
pub mod cli;
pub mod common;
pub mod dispatch;
pub mod err;
pub mod filter;
pub mod lookup;
pub mod model;
