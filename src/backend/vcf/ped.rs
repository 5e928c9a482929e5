//! Reading of PED pedigree files.

use std::path::Path;

use crate::err::Error;

/// One line of a PED file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct PedRecord {
    pub family_id: String,
    pub ind_id: String,
    pub father: String,
    pub mother: String,
    pub sex: String,
    pub phenotype: String,
}

/// The single family described by a PED file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Family {
    pub family_id: String,
    pub members: Vec<PedRecord>,
}

/// Load the family from the tab-separated PED file at `path`.
///
/// Files describing no family or more than one family are rejected.
#[tracing::instrument]
pub fn load_family(path: &Path) -> Result<Family, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| Error::config(path, format!("cannot open pedigree: {}", e)))?;

    let mut family = Family::default();
    for record in reader.deserialize() {
        let record: PedRecord =
            record.map_err(|e| Error::config(path, format!("invalid pedigree line: {}", e)))?;
        if family.members.is_empty() {
            family.family_id = record.family_id.clone();
        } else if record.family_id != family.family_id {
            return Err(Error::config(
                path,
                format!(
                    "only one family can be used with a VCF file, found {} and {}",
                    &family.family_id, &record.family_id
                ),
            ));
        }
        tracing::info!("Found individual {}", &record.ind_id);
        family.members.push(record);
    }

    if family.members.is_empty() {
        return Err(Error::config(path, "pedigree describes no individual"));
    }
    tracing::debug!("Family used in analysis: {}", &family.family_id);
    Ok(family)
}
