//! Adapter for GEMINI-style SQLite query databases.
//!
//! The database provides a `samples` table (one row per sample with its
//! family), a `variants` table with the per-sample genotype data as JSON
//! arrays indexed by `sample_id - 1`, and a `variant_impacts` table with the
//! transcript annotation.  Positions are 1-based with inclusive ends.

pub mod inheritance;
pub mod query;
pub mod row;

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::{
    annotate::build_variant,
    err::Error,
    filter::{FilterSpec, Predicate},
    lookup::Lookups,
    model::{Case, Individual, Variant, VariantMode, VariantType},
};

use self::row::{text, GeminiRow};

use super::{detect_variant_type, Adapter, Capabilities, VariantIter, TYPE_DETECTION_RECORDS};

/// Predicates translated into SQL or evaluated on the query result.
const NATIVE: &[Predicate] = &[
    Predicate::Frequency,
    Predicate::Cadd,
    Predicate::Gene,
    Predicate::ImpactSeverity,
    Predicate::Range,
    Predicate::GeneticModel,
];

/// Open the database read-only.
fn connect(path: &Path) -> Result<Connection, Error> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| Error::invalid_backend(path, "cannot open database", e))
}

/// Read the samples and group them into one case per family, in order of
/// first appearance.
fn load_cases(
    conn: &Connection,
    path: &Path,
    variant_type: VariantType,
) -> Result<Vec<Case>, Error> {
    let db_err = |e: rusqlite::Error| Error::invalid_backend(path, "cannot read samples", e);

    let mut cases: IndexMap<String, Case> = IndexMap::new();
    let mut stmt = conn.prepare("SELECT * FROM samples").map_err(db_err)?;
    let mut rows = stmt.query([]).map_err(db_err)?;
    while let Some(row) = rows.next().map_err(db_err)? {
        let sample_id: i64 = row.get("sample_id").map_err(db_err)?;
        let name = text(row, "name").map_err(db_err)?.unwrap_or_default();
        let family_id = text(row, "family_id").map_err(db_err)?.unwrap_or_default();

        let mut individual =
            Individual::new(&name, &family_id, (sample_id - 1).max(0) as usize, path.into());
        let or_unknown = |value: Option<String>| value.unwrap_or_else(|| String::from("0"));
        individual.father = or_unknown(text(row, "paternal_id").map_err(db_err)?);
        individual.mother = or_unknown(text(row, "maternal_id").map_err(db_err)?);
        individual.sex = or_unknown(text(row, "sex").map_err(db_err)?);
        individual.phenotype = or_unknown(text(row, "phenotype").map_err(db_err)?);

        cases
            .entry(family_id.clone())
            .or_insert_with(|| {
                tracing::info!("Found case {}", &family_id);
                Case::new(&family_id, path.into(), variant_type, VariantMode::Gemini)
            })
            .add_individual(individual);
    }
    Ok(cases.into_values().collect())
}

/// Detect the variant type from the `type` column of the first rows.
fn scan_variant_type(conn: &Connection, path: &Path) -> Result<VariantType, Error> {
    let db_err = |e: rusqlite::Error| Error::invalid_backend(path, "cannot read variants", e);
    let mut stmt = conn
        .prepare("SELECT type FROM variants LIMIT ?1")
        .map_err(db_err)?;
    let is_snv = stmt
        .query_map([TYPE_DETECTION_RECORDS as i64], |row| {
            row.get::<_, Option<String>>(0)
        })
        .map_err(db_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(db_err)?
        .into_iter()
        .map(|variant_type| variant_type.as_deref() == Some("snp"));
    Ok(detect_variant_type(is_snv))
}

/// Query database backend: one case per family of the database.
#[derive(Debug)]
pub struct GeminiAdapter {
    path: PathBuf,
    cases: Vec<Case>,
    lookups: Lookups,
}

impl GeminiAdapter {
    /// Open the database at `path` and read its cases.
    ///
    /// The variant type is detected from the variants unless given.
    #[tracing::instrument(skip(lookups))]
    pub fn new(
        path: &Path,
        variant_type: Option<VariantType>,
        lookups: Lookups,
    ) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::config(path, "variant source does not exist"));
        }
        let conn = connect(path)?;
        let variant_type = match variant_type {
            Some(variant_type) => variant_type,
            None => scan_variant_type(&conn, path)?,
        };
        let cases = load_cases(&conn, path, variant_type)?;
        tracing::info!("Found {} case(s) in {:?}", cases.len(), path);

        Ok(GeminiAdapter {
            path: path.to_path_buf(),
            cases,
            lookups,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

type RowIter<'a> = Box<dyn Iterator<Item = Result<GeminiRow, Error>> + 'a>;

/// Number of rows fetched per round trip to the database.
const BATCH_SIZE: usize = 256;

/// Rows of a query that are variant in a case, with transcripts for small
/// variants, fetched lazily in batches.
///
/// A row that cannot be decoded yields an error and ends the iteration.
struct RowBatches<'a> {
    conn: Connection,
    query: String,
    case: &'a Case,
    offset: usize,
    buffer: std::vec::IntoIter<Result<GeminiRow, Error>>,
    done: bool,
}

impl<'a> RowBatches<'a> {
    /// Open the database of `case` and check that `query` compiles.
    fn new(case: &'a Case, query: &str) -> Result<Self, Error> {
        let conn = connect(&case.variant_source)?;
        let query = format!(
            "SELECT * FROM ({}) LIMIT ?1 OFFSET ?2",
            query.trim().trim_end_matches(';')
        );
        conn.prepare_cached(&query)
            .map_err(|e| Error::invalid_backend(&case.variant_source, "query failed", e))?;
        Ok(RowBatches {
            conn,
            query,
            case,
            offset: 0,
            buffer: Vec::new().into_iter(),
            done: false,
        })
    }

    fn fetch(&mut self) -> Result<Vec<Result<GeminiRow, Error>>, Error> {
        let case = self.case;
        let db_err =
            |e: rusqlite::Error| Error::invalid_backend(&case.variant_source, "query failed", e);

        let mut stmt = self.conn.prepare_cached(&self.query).map_err(db_err)?;
        let mut rows = stmt
            .query([BATCH_SIZE as i64, self.offset as i64])
            .map_err(db_err)?;
        let mut batch = Vec::new();
        let mut seen = 0;
        while let Some(row) = rows.next().map_err(db_err)? {
            seen += 1;
            let mut record = match GeminiRow::from_row(row) {
                Ok(record) => record,
                Err(e) => {
                    batch.push(Err(db_err(e)));
                    self.done = true;
                    break;
                }
            };
            if case.variant_type == VariantType::Snv {
                if !record.is_variant(case) {
                    tracing::debug!("skipping non-variant row {}", record.variant_id);
                    continue;
                }
                if let Err(e) = record.load_transcripts(&self.conn) {
                    batch.push(Err(db_err(e)));
                    self.done = true;
                    break;
                }
            }
            batch.push(Ok(record));
        }
        self.offset += seen;
        if seen < BATCH_SIZE {
            self.done = true;
        }
        Ok(batch)
    }
}

impl Iterator for RowBatches<'_> {
    type Item = Result<GeminiRow, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.next() {
                return Some(row);
            }
            if self.done {
                return None;
            }
            match self.fetch() {
                Ok(batch) => self.buffer = batch.into_iter(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl Adapter for GeminiAdapter {
    fn mode(&self) -> VariantMode {
        VariantMode::Gemini
    }

    fn case_list(&self) -> &[Case] {
        &self.cases
    }

    fn capabilities(&self, case: &Case) -> Capabilities {
        let native: BTreeSet<Predicate> = NATIVE.iter().copied().collect();
        let mut filterable = native.clone();
        filterable.extend([Predicate::Consequence, Predicate::SvLen]);
        Capabilities {
            filterable,
            native,
            structural: case.variant_type == VariantType::Sv,
        }
    }

    fn candidates<'a>(
        &'a self,
        case: &'a Case,
        filter: &'a FilterSpec,
    ) -> Result<VariantIter<'a>, Error> {
        let query = query::build_query(filter);
        tracing::info!("Get variants from {:?}", &case.variant_source);
        let rows = RowBatches::new(case, &query)?;

        // Inheritance needs all rows of the case at once.
        let models = filter.genetic_models();
        let rows: RowIter<'a> = if models.is_empty() {
            Box::new(rows)
        } else {
            let mut rows = rows.collect::<Result<Vec<_>, _>>()?;
            inheritance::annotate(&mut rows, case, &models);
            rows.retain(|row| !row.genetic_models.is_empty());
            Box::new(rows.into_iter().map(Ok))
        };

        let iter = rows.enumerate().map(move |(idx, row)| {
            let mut variant = build_variant(&row?, case, &self.lookups)?;
            tracing::debug!("Updating index to: {}", idx + 1);
            variant.index = Some(idx + 1);
            Ok(variant)
        });
        Ok(Box::new(iter))
    }

    /// Look up a variant by its database id; its index is that id.
    fn variant(&self, case_id: &str, variant_id: &str) -> Result<Option<Variant>, Error> {
        let case = match self.case(case_id) {
            Some(case) => case,
            None => return Ok(None),
        };
        let native_id: i64 = match variant_id.trim().parse() {
            Ok(native_id) => native_id,
            Err(_) => {
                tracing::info!("{} is not a database variant id", variant_id);
                return Ok(None);
            }
        };
        let db_err =
            |e: rusqlite::Error| Error::invalid_backend(&case.variant_source, "query failed", e);

        let conn = connect(&case.variant_source)?;
        let row = conn
            .query_row(
                "SELECT * FROM variants WHERE variant_id = ?1",
                [native_id],
                |row| GeminiRow::from_row(row),
            )
            .optional()
            .map_err(db_err)?;
        let mut row = match row {
            Some(row) => row,
            None => return Ok(None),
        };
        if case.variant_type == VariantType::Snv {
            row.load_transcripts(&conn).map_err(db_err)?;
        }
        let mut variant = build_variant(&row, case, &self.lookups)?;
        variant.index = usize::try_from(native_id).ok();
        Ok(Some(variant))
    }
}

/// Create the query database described by `tests/gemini/trio.sql` in `dir`.
#[cfg(test)]
pub(crate) fn create_test_db(dir: &Path) -> Result<PathBuf, anyhow::Error> {
    let path = dir.join("trio.db");
    let conn = Connection::open(&path)?;
    conn.execute_batch(&std::fs::read_to_string("tests/gemini/trio.sql")?)?;
    Ok(path)
}

#[cfg(test)]
mod test {
    use std::{path::Path, sync::Arc};

    use float_cmp::approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{create_test_db, GeminiAdapter};
    use crate::{
        backend::Adapter,
        err::Error,
        filter::{FilterSpec, Predicate},
        lookup::{cytobands::load_cytoband_db, genes::load_gene_db, Lookups},
        model::{ImpactSeverity, VariantType},
    };

    fn lookups() -> Result<Lookups, anyhow::Error> {
        Ok(Lookups::new(
            Arc::new(load_gene_db(Path::new("tests/lookup/genes.tsv"))?),
            Arc::new(load_cytoband_db(Path::new("tests/lookup/cytoBand.txt"))?),
        ))
    }

    fn adapter(tmp_dir: &temp_testdir::TempDir) -> Result<GeminiAdapter, anyhow::Error> {
        let path = create_test_db(tmp_dir)?;
        Ok(GeminiAdapter::new(&path, None, lookups()?)?)
    }

    fn ids(adapter: &GeminiAdapter, case_id: &str, json: &str) -> Result<Vec<String>, anyhow::Error> {
        let filter = FilterSpec::from_json(json)?;
        let page = adapter.variants(case_id, 0, 100, &filter)?.unwrap();
        assert_eq!(page.total, page.variants.len());
        Ok(page.variants.into_iter().map(|v| v.variant_id).collect())
    }

    #[test]
    fn cases() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;

        let case_ids: Vec<&str> = adapter
            .cases(None)
            .iter()
            .map(|case| case.case_id.as_str())
            .collect();
        assert_eq!(case_ids, vec!["636808", "other"]);

        let case = adapter.case("636808").unwrap();
        assert_eq!(case.variant_type, VariantType::Snv);
        assert_eq!(
            case.individuals
                .iter()
                .map(|ind| (ind.ind_id.as_str(), ind.ind_index))
                .collect::<Vec<_>>(),
            vec![("ADM1059A1", 0), ("ADM1059A2", 1), ("ADM1059A3", 2)]
        );
        let child = adapter.individual("ADM1059A1").unwrap();
        assert_eq!((child.father.as_str(), child.mother.as_str()), ("ADM1059A2", "ADM1059A3"));
        assert!(child.is_affected());
        assert_eq!(child.sex_human(), "male");
        assert_eq!(adapter.individual("ADM1060A1").unwrap().ind_index, 3);
        assert_eq!(adapter.cases(Some("oth")).len(), 1);
        Ok(())
    }

    #[test]
    fn capabilities() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;
        let capabilities = adapter.capabilities(adapter.case("636808").unwrap());
        assert!(capabilities.can_filter(Predicate::Consequence));
        assert!(!capabilities.native.contains(&Predicate::Consequence));
        assert!(capabilities.native.contains(&Predicate::GeneticModel));
        assert!(!capabilities.can_filter(Predicate::SvType));
        assert!(!capabilities.structural);
        Ok(())
    }

    #[test]
    fn non_variant_rows_are_skipped() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;

        let page = adapter
            .variants("636808", 0, 100, &FilterSpec::default())?
            .unwrap();
        assert_eq!(page.total, 6);
        assert_eq!(
            page.variants
                .iter()
                .map(|v| (v.variant_id.as_str(), v.index))
                .collect::<Vec<_>>(),
            vec![
                ("2", Some(1)),
                ("3", Some(2)),
                ("4", Some(3)),
                ("5", Some(4)),
                ("6", Some(5)),
                ("7", Some(6)),
            ]
        );
        assert_eq!(ids(&adapter, "other", "{}")?, vec!["1", "6"]);
        Ok(())
    }

    #[rstest]
    #[case(r#"{"frequency": "0.003"}"#, vec!["2", "3"])]
    #[case(r#"{"cadd": 25}"#, vec!["3", "5", "7"])]
    #[case(r#"{"gene_ids": ["GLMN"]}"#, vec!["4", "5"])]
    #[case(r#"{"impact_severities": ["HIGH"]}"#, vec!["3", "5"])]
    #[case(r#"{"range": {"chromosome": "1", "start": 879000, "end": 880000}}"#, vec!["2", "3"])]
    #[case(r#"{"consequence": ["missense_variant"]}"#, vec!["2", "4", "7"])]
    #[case(r#"{"consequence": ["missense_variant"], "cadd": 22}"#, vec!["2", "7"])]
    #[case(r#"{"genetic_models": ["AR_comp"]}"#, vec!["2", "3"])]
    #[case(r#"{"genetic_models": ["AD_dn"]}"#, vec!["4"])]
    #[case(r#"{"genetic_models": ["AR_hom", "XR"]}"#, vec!["5", "6"])]
    #[case(r#"{"gemini_query": "SELECT * FROM variants v WHERE v.type = 'indel'"}"#, vec!["5"])]
    #[case(r#"{"gemini_query": "SELECT * FROM variants v WHERE v.type = 'indel';"}"#, vec!["5"])]
    fn filters(#[case] json: &str, #[case] expected: Vec<&str>) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;
        assert_eq!(ids(&adapter, "636808", json)?, expected);
        Ok(())
    }

    #[test]
    fn native_filters_renumber() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;
        let filter = FilterSpec::from_json(r#"{"gene_ids": ["GLMN"]}"#)?;
        let page = adapter.variants("636808", 0, 10, &filter)?.unwrap();
        assert_eq!(
            page.variants.iter().map(|v| v.index).collect::<Vec<_>>(),
            vec![Some(1), Some(2)]
        );
        Ok(())
    }

    #[test]
    fn compound_partners() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;
        let filter = FilterSpec::from_json(r#"{"genetic_models": ["AR_comp"]}"#)?;
        let page = adapter.variants("636808", 0, 10, &filter)?.unwrap();

        let first = &page.variants[0];
        assert_eq!(first.genetic_models, vec!["AR_comp"]);
        assert_eq!(first.compounds.len(), 1);
        assert_eq!(first.compounds[0].variant_id, "3");
        assert!(approx_eq!(
            f64,
            first.compounds[0].combined_score.unwrap(),
            62.3,
            epsilon = 1e-9
        ));
        Ok(())
    }

    #[test]
    fn pagination() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;
        let page = adapter
            .variants("636808", 1, 2, &FilterSpec::default())?
            .unwrap();
        assert_eq!(page.total, 6);
        assert_eq!(
            page.variants
                .iter()
                .map(|v| v.variant_id.as_str())
                .collect::<Vec<_>>(),
            vec!["3", "4"]
        );
        assert!(adapter
            .variants("unknown", 0, 10, &FilterSpec::default())?
            .is_none());
        Ok(())
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    fn pagination_mixes_native_and_post_hoc_filters(
        #[case] skip: usize,
    ) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;
        let json = r#"{"consequence": ["missense_variant", "stop_gained"], "cadd": 22}"#;
        let filter = FilterSpec::from_json(json)?;
        let all = ids(&adapter, "636808", json)?;
        assert_eq!(all, vec!["2", "3", "7"]);

        let page = adapter.variants("636808", skip, 2, &filter)?.unwrap();
        assert_eq!(page.total, all.len());
        assert_eq!(
            page.variants
                .iter()
                .map(|v| v.variant_id.clone())
                .collect::<Vec<_>>(),
            all.iter().skip(skip).take(2).cloned().collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn stream_yields_rows_before_a_broken_one() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = create_test_db(&tmp_dir)?;
        rusqlite::Connection::open(&path)?
            .execute("UPDATE variants SET gts = 'broken' WHERE variant_id = 7", [])?;
        let adapter = GeminiAdapter::new(&path, None, lookups()?)?;

        let filter = FilterSpec::default();
        let mut stream = adapter.stream("636808", &filter)?.unwrap();
        let first = stream.next().unwrap()?;
        assert_eq!((first.variant_id.as_str(), first.index), ("2", Some(1)));

        let rest: Vec<_> = stream.collect();
        assert_eq!(rest.iter().filter(|v| v.is_ok()).count(), 4);
        assert!(rest.last().unwrap().as_ref().unwrap_err().is_invalid_backend());
        Ok(())
    }

    #[test]
    fn single_variant() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;

        let variant = adapter.variant("636808", "2")?.unwrap();
        assert_eq!(variant.index, Some(2));
        assert_eq!(variant.chrom, "1");
        assert_eq!((variant.start, variant.stop), (879576, 879576));
        assert_eq!(variant.rs_id, "rs1000");
        assert_eq!(variant.most_severe_consequence.as_deref(), Some("missense_variant"));
        assert_eq!(variant.impact_severity, Some(ImpactSeverity::Medium));
        assert_eq!(variant.gene_symbols, vec!["SAMD11", "NOC2L"]);
        assert_eq!(variant.transcripts.len(), 2);
        assert_eq!(variant.transcripts[0].hgvs_c.as_deref(), Some("c.10C>T"));
        assert_eq!(variant.transcripts[0].hgvs_p.as_deref(), Some("R/W, 4/681"));
        assert_eq!(variant.max_freq, Some(0.002));
        assert_eq!(variant.cadd_score, Some(24.3));
        assert_eq!(
            variant
                .severities
                .iter()
                .map(|s| (s.name.as_str(), s.value.as_str()))
                .collect::<Vec<_>>(),
            vec![("Polyphen", "probably_damaging"), ("SIFT", "deleterious")]
        );
        assert_eq!(
            variant
                .genotypes
                .iter()
                .map(|gt| (gt.sample_id.as_str(), gt.genotype.as_str(), gt.depth))
                .collect::<Vec<_>>(),
            vec![
                ("ADM1059A1", "C/T", Some(22)),
                ("ADM1059A2", "C/T", Some(26)),
                ("ADM1059A3", "C/C", Some(30)),
            ]
        );

        let indel = adapter.variant("636808", "5")?.unwrap();
        assert_eq!((indel.start, indel.stop), (92498098, 92498102));
        assert_eq!(indel.impact_severity, Some(ImpactSeverity::High));

        assert!(adapter.variant("636808", "99")?.is_none());
        assert!(adapter.variant("636808", "1_879576_C_T")?.is_none());
        assert!(adapter.variant("unknown", "2")?.is_none());
        Ok(())
    }

    #[test]
    fn missing_database_is_config_error() -> Result<(), anyhow::Error> {
        let err = GeminiAdapter::new(Path::new("tests/gemini/missing.db"), None, Lookups::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        Ok(())
    }

    #[test]
    fn broken_database_is_invalid_backend() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("broken.db");
        std::fs::write(&path, "this is not a database")?;
        let err = GeminiAdapter::new(&path, None, Lookups::default()).unwrap_err();
        assert!(err.is_invalid_backend());

        let path = tmp_dir.join("empty.db");
        rusqlite::Connection::open(&path)?.execute_batch("CREATE TABLE other (x INTEGER)")?;
        let err = GeminiAdapter::new(&path, Some(VariantType::Snv), Lookups::default()).unwrap_err();
        assert!(err.is_invalid_backend());
        Ok(())
    }

    #[test]
    fn invalid_query_is_invalid_backend() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let adapter = adapter(&tmp_dir)?;
        let filter = FilterSpec::from_json(r#"{"gemini_query": "SELECT * FROM nothing"}"#)?;
        let err = adapter.variants("636808", 0, 10, &filter).unwrap_err();
        assert!(err.is_invalid_backend());
        Ok(())
    }
}
