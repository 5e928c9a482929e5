//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Strip a leading `chr`/`CHR` prefix from a chromosome name.
///
/// Only the literal prefix is removed, so `"chrX"` becomes `"X"` and `"HLA"`
/// stays as it is.
pub fn canonicalize(chrom: &str) -> &str {
    chrom
        .strip_prefix("chr")
        .or_else(|| chrom.strip_prefix("CHR"))
        .or_else(|| chrom.strip_prefix("Chr"))
        .unwrap_or(chrom)
}

/// Helper type for classifying genotype calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenotypeClass {
    /// hom. ref.
    HomRef,
    /// het.
    Het,
    /// hom. alt.
    HomAlt,
    /// other, includes no-call
    Unknown,
}

impl GenotypeClass {
    /// Classify a VCF-style genotype string, e.g., `"0/1"`.
    pub fn from_gt(gt: &str) -> Self {
        let alleles = gt
            .split(['/', '|'])
            .map(|a| a.parse::<u32>().ok())
            .collect::<Vec<_>>();
        if alleles.is_empty() || alleles.iter().any(|a| a.is_none()) {
            return GenotypeClass::Unknown;
        }
        let alleles = alleles.into_iter().flatten().collect::<Vec<_>>();
        let n_ref = alleles.iter().filter(|a| **a == 0).count();
        if n_ref == alleles.len() {
            GenotypeClass::HomRef
        } else if n_ref == 0 && alleles.iter().all(|a| *a == alleles[0]) {
            GenotypeClass::HomAlt
        } else {
            GenotypeClass::Het
        }
    }

    /// Whether the call carries an alternate allele.
    pub fn is_variant(&self) -> bool {
        matches!(self, GenotypeClass::Het | GenotypeClass::HomAlt)
    }
}
