//! Header of a VCF file.

use std::path::Path;

use noodles_vcf as vcf;

use crate::{annotate::transcripts::AnnotationFormat, common::io::read_lines, err::Error};

/// Number of fixed columns before `FORMAT`.
pub const FIXED_COLUMNS: usize = 8;

/// The information of the header needed to interpret data lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcfHeader {
    /// Names of the columns of the `#CHROM` line, without the `#`.
    pub columns: Vec<String>,
    pub sample_names: Vec<String>,
    /// Columns of the `CSQ` annotation, empty without VEP annotation.
    pub vep_columns: Vec<String>,
    /// Columns of the `ANN` annotation, empty without snpEff annotation.
    pub snpeff_columns: Vec<String>,
    /// The parsed header, needed to parse data lines.
    pub inner: vcf::Header,
}

impl VcfHeader {
    /// Build from a parsed `noodles` header.
    pub fn from_noodles(header: &vcf::Header) -> Self {
        let sample_names: Vec<String> = header.sample_names().iter().cloned().collect();
        let mut columns: Vec<String> = [
            "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        if !sample_names.is_empty() {
            columns.push(String::from("FORMAT"));
            columns.extend(sample_names.iter().cloned());
        }

        let annotation_columns = |format: AnnotationFormat| -> Vec<String> {
            header
                .infos()
                .iter()
                .find(|(key, _)| key.to_string() == format.info_key())
                .map(|(_, info)| {
                    let columns = format.columns_from_description(info.description());
                    if columns.is_empty() {
                        format.default_columns()
                    } else {
                        columns
                    }
                })
                .unwrap_or_default()
        };

        VcfHeader {
            columns,
            vep_columns: annotation_columns(AnnotationFormat::Vep),
            snpeff_columns: annotation_columns(AnnotationFormat::SnpEff),
            sample_names,
            inner: header.clone(),
        }
    }

    /// Position of the given sample among the samples.
    pub fn sample_index(&self, sample_name: &str) -> Option<usize> {
        self.sample_names.iter().position(|name| name == sample_name)
    }
}

/// Read and parse the header of the (possibly gzip-compressed) VCF file at
/// `path`.
#[tracing::instrument]
pub fn read_header(path: &Path) -> Result<VcfHeader, Error> {
    tracing::info!("Parsing header of file {:?}", path);
    let mut text = String::new();
    for line in read_lines(path).map_err(|e| Error::invalid_backend(path, "cannot open", e))? {
        let line = line.map_err(|e| Error::invalid_backend(path, "cannot read header", e))?;
        if !line.starts_with('#') {
            break;
        }
        text.push_str(&line);
        text.push('\n');
    }
    if !text.lines().any(|line| line.starts_with("#CHROM")) {
        return Err(Error::InvalidBackend {
            path: path.into(),
            msg: String::from("header lacks the #CHROM line"),
            source: None,
        });
    }

    let header: vcf::Header = text
        .parse()
        .map_err(|e| Error::invalid_backend(path, "malformed header", e))?;
    Ok(VcfHeader::from_noodles(&header))
}
