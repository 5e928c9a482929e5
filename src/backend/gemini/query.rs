//! Translation of filters into SQL on the `variants` table.

use itertools::Itertools;

use crate::{
    common::canonicalize,
    filter::FilterSpec,
    model::ImpactSeverity,
};

/// Query used unless the filter brings its own.
pub const BASE_QUERY: &str = "SELECT * FROM variants v";

/// Quote `value` as an SQL string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Append `clause` to `query`, with `WHERE` for the first clause and `AND`
/// for all further ones.
pub fn append_clause(query: &str, clause: &str) -> String {
    if query.to_uppercase().contains("WHERE") {
        format!("{} AND {}", query, clause)
    } else {
        format!("{} WHERE {}", query, clause)
    }
}

/// Abbreviation of the impact severity as stored in the database.
fn severity_code(severity: ImpactSeverity) -> &'static str {
    match severity {
        ImpactSeverity::High => "HIGH",
        ImpactSeverity::Medium => "MED",
        ImpactSeverity::Low => "LOW",
    }
}

/// Build the SQL selecting the candidate rows for `filter`.
///
/// The frequency ceiling lets rows without frequency pass.  Ranges match
/// rows contained in them, with and without `chr` prefix.
pub fn build_query(filter: &FilterSpec) -> String {
    let mut query = filter.gemini_query().unwrap_or(BASE_QUERY).to_string();

    if let Some(frequency) = filter.frequency() {
        query = append_clause(
            &query,
            &format!(
                "(v.max_aaf_all < {} OR v.max_aaf_all IS NULL)",
                frequency
            ),
        );
    }
    if let Some(cadd) = filter.cadd() {
        query = append_clause(&query, &format!("(v.cadd_scaled > {})", cadd));
    }
    let gene_ids = filter.gene_ids();
    if !gene_ids.is_empty() {
        query = append_clause(
            &query,
            &format!("v.gene IN ({})", gene_ids.iter().map(|g| quote(g)).join(", ")),
        );
    }
    let severities = filter.impact_severities();
    if !severities.is_empty() {
        query = append_clause(
            &query,
            &format!(
                "v.impact_severity IN ({})",
                severities
                    .iter()
                    .map(|s| quote(severity_code(*s)))
                    .join(", ")
            ),
        );
    }
    if let Some(range) = filter.range() {
        let chrom = canonicalize(range.chromosome.trim());
        query = append_clause(
            &query,
            &format!(
                "v.chrom IN ({}, {}) AND v.start >= {} AND v.end <= {}",
                quote(&format!("chr{}", chrom)),
                quote(chrom),
                range.start,
                range.end
            ),
        );
    }

    tracing::debug!("Built query: {}", &query);
    query
}
