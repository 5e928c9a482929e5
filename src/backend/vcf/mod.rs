//! Adapter for (possibly gzip-compressed) VCF files.

pub mod header;
pub mod ped;
pub mod record;

use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use crate::{
    annotate::{build_variant, RawRecord},
    common::io::{is_gz, read_lines},
    err::Error,
    filter::{FilterSpec, Predicate},
    lookup::Lookups,
    model::{Case, Individual, Variant, VariantMode, VariantType},
};

use self::{header::VcfHeader, ped::Family, record::VcfRecord};

use super::{detect_variant_type, Adapter, Capabilities, VariantIter};

/// Cheap substring check on raw lines, run before parsing.
///
/// Each non-empty group of needles must have at least one match in the
/// line.  The exact predicates still run on the enriched variants.
#[derive(Debug, Clone, Default)]
pub struct LinePrefilter {
    groups: Vec<Vec<String>>,
}

impl LinePrefilter {
    pub fn new(filter: &FilterSpec) -> Self {
        let groups = [
            filter.gene_ids(),
            filter.consequences(),
            filter.sv_types(),
        ]
        .into_iter()
        .filter(|group| !group.is_empty())
        .map(|group| group.into_iter().map(String::from).collect())
        .collect();
        LinePrefilter { groups }
    }

    pub fn keep(&self, line: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|needle| line.contains(needle.as_str())))
    }
}

fn is_data_line(line: &str) -> bool {
    !line.starts_with('#') && !line.trim().is_empty()
}

fn case_individuals(
    path: &Path,
    header: &VcfHeader,
    family: Option<&Family>,
) -> Result<(String, Vec<Individual>), Error> {
    match family {
        Some(family) => {
            let mut individuals = Vec::new();
            for member in &family.members {
                let ind_index = header
                    .sample_names
                    .iter()
                    .position(|name| name == &member.ind_id)
                    .ok_or_else(|| {
                        Error::config(
                            path,
                            format!(
                                "individual {} exists in pedigree but not in the VCF",
                                &member.ind_id
                            ),
                        )
                    })?;
                individuals.push(Individual {
                    mother: member.mother.clone(),
                    father: member.father.clone(),
                    sex: member.sex.clone(),
                    phenotype: member.phenotype.clone(),
                    ..Individual::new(&member.ind_id, &family.family_id, ind_index, path.into())
                });
            }
            Ok((family.family_id.clone(), individuals))
        }
        None => {
            let case_id = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            let individuals = header
                .sample_names
                .iter()
                .enumerate()
                .map(|(ind_index, name)| Individual::new(name, &case_id, ind_index, path.into()))
                .collect();
            Ok((case_id, individuals))
        }
    }
}

/// Detect the variant type from the first records of the file.
fn scan_variant_type(path: &Path, header: &VcfHeader) -> Result<VariantType, Error> {
    let lines = read_lines(path).map_err(|e| Error::invalid_backend(path, "cannot open", e))?;
    let is_snv = lines
        .map_while(Result::ok)
        .filter(|line| is_data_line(line))
        .map(|line| {
            VcfRecord::parse(&line, header)
                .map(|record| record.is_snv())
                .unwrap_or(false)
        });
    Ok(detect_variant_type(is_snv))
}

/// Build the case of one VCF file.
pub fn load_case(
    path: &Path,
    family: Option<&Family>,
    variant_type: Option<VariantType>,
) -> Result<(Case, VcfHeader), Error> {
    let header = header::read_header(path)?;
    let variant_type = match variant_type {
        Some(variant_type) => variant_type,
        None => scan_variant_type(path, &header)?,
    };
    let (case_id, individuals) = case_individuals(path, &header, family)?;

    let mut case = Case::new(&case_id, path.into(), variant_type, VariantMode::Vcf);
    tracing::info!("Found case {}", &case_id);
    if is_gz(path) {
        tracing::debug!("Found compressed variant source");
        case.compressed = true;
        let mut tabix = path.as_os_str().to_owned();
        tabix.push(".tbi");
        if Path::new(&tabix).exists() {
            tracing::debug!("Found index file");
            case.tabix_index = true;
        }
    }
    for individual in individuals {
        case.add_individual(individual);
    }
    Ok((case, header))
}

/// VCF backend: one case per file.
#[derive(Debug)]
pub struct VcfAdapter {
    root: PathBuf,
    cases: Vec<Case>,
    headers: HashMap<String, VcfHeader>,
    lookups: Lookups,
}

impl VcfAdapter {
    /// Open a single VCF file, optionally with a PED file describing its
    /// family, or all VCF files below a directory.
    ///
    /// The variant type is detected from the records unless given.
    pub fn new(
        root: &Path,
        path_ped: Option<&Path>,
        variant_type: Option<VariantType>,
        lookups: Lookups,
    ) -> Result<Self, Error> {
        if !root.exists() {
            return Err(Error::config(root, "variant source does not exist"));
        }
        let family = path_ped.map(ped::load_family).transpose()?;

        let paths: Vec<PathBuf> = if root.is_dir() {
            if family.is_some() {
                return Err(Error::config(
                    root,
                    "a pedigree can only be given for a single VCF file",
                ));
            }
            walkdir::WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| {
                    let name = path.to_string_lossy();
                    name.ends_with(".vcf") || name.ends_with(".vcf.gz")
                })
                .collect()
        } else {
            vec![root.to_path_buf()]
        };

        let mut cases = Vec::new();
        let mut headers = HashMap::new();
        for path in paths {
            let (case, header) = load_case(&path, family.as_ref(), variant_type)?;
            if headers.contains_key(&case.case_id) {
                tracing::warn!("Skipping {:?}, case {} already exists", &path, &case.case_id);
                continue;
            }
            headers.insert(case.case_id.clone(), header);
            cases.push(case);
        }
        tracing::info!("Found {} case(s) in {:?}", cases.len(), root);

        Ok(VcfAdapter {
            root: root.to_path_buf(),
            cases,
            headers,
            lookups,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn header(&self, case: &Case) -> Result<&VcfHeader, Error> {
        self.headers
            .get(&case.case_id)
            .ok_or_else(|| Error::config(&case.variant_source, "case has no parsed header"))
    }

    /// Data lines of the case's file.
    fn data_lines(case: &Case) -> Result<impl Iterator<Item = Result<String, Error>>, Error> {
        let lines = read_lines(&case.variant_source)
            .map_err(|e| Error::invalid_backend(&case.variant_source, "cannot open", e))?;
        Ok(lines
            .map(|line| line.map_err(Error::from))
            .filter(|line| line.as_ref().map(|l| is_data_line(l)).unwrap_or(true)))
    }
}

impl Adapter for VcfAdapter {
    fn mode(&self) -> VariantMode {
        VariantMode::Vcf
    }

    fn case_list(&self) -> &[Case] {
        &self.cases
    }

    fn capabilities(&self, case: &Case) -> Capabilities {
        let filterable: BTreeSet<Predicate> = match case.variant_type {
            VariantType::Sv => [
                Predicate::Gene,
                Predicate::SvType,
                Predicate::SvLen,
                Predicate::Range,
            ]
            .into(),
            VariantType::Snv => [
                Predicate::Gene,
                Predicate::Frequency,
                Predicate::Cadd,
                Predicate::Consequence,
                Predicate::ImpactSeverity,
                Predicate::GeneticModel,
                Predicate::Range,
            ]
            .into(),
        };
        Capabilities {
            filterable,
            native: BTreeSet::new(),
            structural: case.variant_type == VariantType::Sv,
        }
    }

    fn candidates<'a>(
        &'a self,
        case: &'a Case,
        filter: &'a FilterSpec,
    ) -> Result<VariantIter<'a>, Error> {
        let header = self.header(case)?;
        let prefilter = LinePrefilter::new(filter);
        tracing::info!("Get variants from {:?}", &case.variant_source);

        let iter = Self::data_lines(case)?
            .filter(move |line| line.as_ref().map(|l| prefilter.keep(l)).unwrap_or(true))
            .enumerate()
            .map(move |(idx, line)| {
                let line = line?;
                let record = VcfRecord::parse(&line, header)?;
                let mut variant = build_variant(&record, case, &self.lookups)?;
                tracing::debug!("Updating index to: {}", idx + 1);
                variant.index = Some(idx + 1);
                Ok(variant)
            });
        Ok(Box::new(iter))
    }

    /// Look up a variant by its content id, e.g., `1_880086_T_C`.
    fn variant(&self, case_id: &str, variant_id: &str) -> Result<Option<Variant>, Error> {
        let case = match self.case(case_id) {
            Some(case) => case,
            None => return Ok(None),
        };
        let header = self.header(case)?;
        for (idx, line) in Self::data_lines(case)?.enumerate() {
            let line = line?;
            let record = VcfRecord::parse(&line, header)?;
            let line_id = Variant::content_id(
                record.chrom(),
                record.pos(),
                record.reference(),
                record.alternative(),
            );
            if line_id == variant_id {
                let mut variant = build_variant(&record, case, &self.lookups)?;
                variant.index = Some(idx + 1);
                return Ok(Some(variant));
            }
        }
        Ok(None)
    }
}
