//! Canonical, backend-independent records.
//!
//! Backend adapters build a [`Variant`] from their raw records and the
//! enrichers in [`crate::annotate`] fill in the derived fields.

mod case;
mod gene;
mod genotype;
mod transcript;
mod variant;

pub use case::{Case, Individual, VariantMode, VariantType};
pub use gene::Gene;
pub use genotype::Genotype;
pub use transcript::Transcript;
pub use variant::{Compound, Frequency, ImpactSeverity, Severity, Variant};
