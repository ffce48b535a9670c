//! Pipeline configuration.
//!
//! Everything the handlers need (bucket names, source mappings, the report
//! query) lives here, with production defaults and an optional
//! `cadata.toml` override file. Tests substitute configuration by building
//! these structs directly.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use toml_edit::{DocumentMut, TableLike};

use crate::common::*;
use crate::wait::WaitOptions;

/// The join producing the report: adverse-event rates by county, alongside
/// population, share of seniors, and median family income.
const REPORT_QUERY: &str = r#"
WITH county_hospitalization AS (
    SELECT year, county, ROUND(SUM(obsrate), 2) AS observed_rate
    FROM "california-hospitalizations-adverse-events"."hospitalization" h
    GROUP BY 1, 2
    ORDER BY 1, 2
)

SELECT h.county,
       p.popestimate AS population,
       h.observed_rate,
       ROUND(CAST(age65plus_tot AS double) / CAST(age18plus_tot AS double) * 100, 2) AS age65_adults_percent,
       i.median_family_income
FROM county_hospitalization h
LEFT JOIN "california-hospitalizations-adverse-events"."population" p
    ON p.ctyname = concat(h.county, ' County')
LEFT JOIN "california-hospitalizations-adverse-events"."income" i
    ON i.county = h.county
WHERE h.year = 2014
      AND p.year = 6
ORDER BY 1
"#;

/// Find the path to our configuration directory.
pub(crate) fn config_dir() -> Result<PathBuf> {
    // Use `var_os` instead of `var`, because if it returns a non-Unicode
    // path, we can hand it off directly to `PathBuf`.
    match env::var_os("CADATA_CONFIG_DIR") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(dirs::config_dir()
            .ok_or_else(|| format_err!("could not find user config dir"))?
            .join("cadata")),
    }
}

/// Find the path to our configuration file.
pub(crate) fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("cadata.toml"))
}

/// A dataset to download, and the key to store it under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    /// Destination key in the acquisition bucket.
    pub key: String,
    /// Where to fetch the dataset from.
    pub url: Url,
}

/// Where the scraped income table comes from and where it lands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomeSource {
    /// Page carrying the income table.
    pub url: Url,
    /// Destination key for the normalized CSV.
    pub key: String,
}

/// Configuration for the acquisition handler.
#[derive(Clone, Debug)]
pub struct AcquireConfig {
    /// Bucket that receives all acquired datasets.
    pub bucket: String,
    /// CSV downloads, stored verbatim.
    pub sources: Vec<Source>,
    /// The scraped income table.
    pub income: IncomeSource,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            bucket: "california-data-test".to_owned(),
            sources: vec![
                Source {
                    key: "population/ca-county-2010-2020-population.csv".to_owned(),
                    url: default_url("https://www2.census.gov/programs-surveys/popest/datasets/2010-2020/counties/asrh/CC-EST2020-AGESEX-06.csv"),
                },
                Source {
                    key: "hospitalization/ca-hospitalization-counts-adverse-events.csv".to_owned(),
                    url: default_url("https://data.chhs.ca.gov/dataset/9638e316-763e-4f69-b827-e9aba51c1f33/resource/d08f328e-0cd9-4df4-92f2-99ae5261b50a/download/ca-oshpd-adveventhospitalizationspsi-county2005-2015q3.csv"),
                },
            ],
            income: IncomeSource {
                url: default_url("https://en.wikipedia.org/wiki/List_of_California_locations_by_income"),
                key: "income/ca-family-income-2014.csv".to_owned(),
            },
        }
    }
}

/// Configuration for the report handler.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Logical Athena database the query runs against.
    pub database: String,
    /// SQL text of the report query.
    pub query: String,
    /// Bucket holding query output.
    pub bucket: String,
    /// Key prefix Athena writes result objects under.
    pub output_prefix: String,
    /// Final, human-readable name for the report object.
    pub report_name: String,
    /// How to poll for query completion.
    pub wait: WaitOptions,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            database: "california-hospitalizations-adverse-events".to_owned(),
            query: REPORT_QUERY.to_owned(),
            bucket: "california-data".to_owned(),
            output_prefix: "output".to_owned(),
            report_name: "ca-hospitalization-population-income.csv".to_owned(),
            wait: WaitOptions::default(),
        }
    }
}

impl ReportConfig {
    /// The `s3://` location Athena writes result objects to.
    pub fn output_location(&self) -> String {
        format!("s3://{}/{}/", self.bucket, self.output_prefix)
    }

    /// Key of the result object Athena wrote for `execution_id`.
    pub fn result_key(&self, execution_id: &str) -> String {
        format!("{}/{}.csv", self.output_prefix, execution_id)
    }

    /// Destination key for the renamed report object.
    pub fn report_key(&self) -> String {
        format!("{}/{}", self.output_prefix, self.report_name)
    }
}

/// Our `cadata.toml` configuration: production defaults, optionally
/// overridden by a file.
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    /// Acquisition handler settings.
    pub acquire: AcquireConfig,
    /// Report handler settings.
    pub report: ReportConfig,
}

impl Configuration {
    /// Load our default configuration, applying `cadata.toml` if present.
    pub fn try_default() -> Result<Self> {
        let path = config_file()?;
        if path.exists() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration overrides from the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let doc = text
            .parse::<DocumentMut>()
            .with_context(|| format!("could not parse {}", path.display()))?;
        Self::from_doc(&doc)
    }

    /// Apply overrides from a parsed TOML document onto the defaults.
    /// Unrecognized keys are ignored.
    fn from_doc(doc: &DocumentMut) -> Result<Self> {
        let mut config = Self::default();

        if let Some(acquire) = section(doc, "acquire")? {
            if let Some(bucket) = get_str(acquire, "acquire", "bucket")? {
                config.acquire.bucket = bucket;
            }
            if let Some(sources) = get_sources(acquire)? {
                config.acquire.sources = sources;
            }
            if let Some(url) = get_url(acquire, "acquire", "income_url")? {
                config.acquire.income.url = url;
            }
            if let Some(key) = get_str(acquire, "acquire", "income_key")? {
                config.acquire.income.key = key;
            }
        }

        if let Some(report) = section(doc, "report")? {
            if let Some(database) = get_str(report, "report", "database")? {
                config.report.database = database;
            }
            if let Some(query) = get_str(report, "report", "query")? {
                config.report.query = query;
            }
            if let Some(bucket) = get_str(report, "report", "bucket")? {
                config.report.bucket = bucket;
            }
            if let Some(prefix) = get_str(report, "report", "output_prefix")? {
                config.report.output_prefix = prefix;
            }
            if let Some(name) = get_str(report, "report", "report_name")? {
                config.report.report_name = name;
            }
            if let Some(secs) = get_secs(report, "report", "poll_timeout_secs")? {
                config.report.wait = config.report.wait.timeout(secs);
            }
        }

        Ok(config)
    }
}

/// Parse a hard-coded default URL.
fn default_url(s: &str) -> Url {
    s.parse().expect("hard-coded URL should be valid")
}

/// Look up a top-level table, if present.
fn section<'a>(doc: &'a DocumentMut, name: &str) -> Result<Option<&'a dyn TableLike>> {
    match doc.get(name) {
        None => Ok(None),
        Some(item) => Ok(Some(item.as_table_like().ok_or_else(|| {
            format_err!("expected [{}] to be a table", name)
        })?)),
    }
}

/// Look up a string key, if present.
fn get_str(
    table: &dyn TableLike,
    section: &str,
    key: &str,
) -> Result<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(item) => Ok(Some(
            item.as_str()
                .ok_or_else(|| {
                    format_err!("expected `{}.{}` to be a string", section, key)
                })?
                .to_owned(),
        )),
    }
}

/// Look up a URL-valued key, if present.
fn get_url(table: &dyn TableLike, section: &str, key: &str) -> Result<Option<Url>> {
    match get_str(table, section, key)? {
        None => Ok(None),
        Some(s) => Ok(Some(s.parse::<Url>().with_context(|| {
            format!("could not parse `{}.{}` as a URL", section, key)
        })?)),
    }
}

/// Look up a duration key given in whole seconds, if present.
fn get_secs(
    table: &dyn TableLike,
    section: &str,
    key: &str,
) -> Result<Option<Duration>> {
    match table.get(key) {
        None => Ok(None),
        Some(item) => {
            let secs = item.as_integer().ok_or_else(|| {
                format_err!("expected `{}.{}` to be an integer", section, key)
            })?;
            let secs = u64::try_from(secs).map_err(|_| {
                format_err!("expected `{}.{}` to be non-negative", section, key)
            })?;
            Ok(Some(Duration::from_secs(secs)))
        }
    }
}

/// Look up the `[[acquire.source]]` list, if present. A configured list
/// replaces the default one wholesale.
fn get_sources(table: &dyn TableLike) -> Result<Option<Vec<Source>>> {
    let item = match table.get("source") {
        None => return Ok(None),
        Some(item) => item,
    };
    let tables = item.as_array_of_tables().ok_or_else(|| {
        format_err!("expected `acquire.source` to be an array of tables")
    })?;

    let mut sources = Vec::with_capacity(tables.len());
    for entry in tables.iter() {
        let key = get_str(entry, "acquire.source", "key")?
            .ok_or_else(|| format_err!("`acquire.source` entries need a `key`"))?;
        let url = get_url(entry, "acquire.source", "url")?
            .ok_or_else(|| format_err!("`acquire.source` entries need a `url`"))?;
        sources.push(Source { key, url });
    }
    Ok(Some(sources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_match_production_values() {
        let config = Configuration::default();
        assert_eq!(config.acquire.bucket, "california-data-test");
        assert_eq!(config.acquire.sources.len(), 2);
        assert_eq!(
            config.acquire.sources[0].key,
            "population/ca-county-2010-2020-population.csv",
        );
        assert_eq!(
            config.acquire.income.key,
            "income/ca-family-income-2014.csv",
        );
        assert_eq!(config.report.bucket, "california-data");
        assert_eq!(
            config.report.database,
            "california-hospitalizations-adverse-events",
        );
        assert!(config.report.query.contains("county_hospitalization"));
    }

    #[test]
    fn report_paths_are_derived_from_prefix() {
        let report = ReportConfig::default();
        assert_eq!(report.output_location(), "s3://california-data/output/");
        assert_eq!(report.result_key("abc-123"), "output/abc-123.csv");
        assert_eq!(
            report.report_key(),
            "output/ca-hospitalization-population-income.csv",
        );
    }

    #[test]
    fn overrides_replace_defaults() {
        let doc = r#"
[acquire]
bucket = "test-bucket"
income_url = "https://example.com/income"
income_key = "income/test.csv"

[[acquire.source]]
key = "population/test.csv"
url = "https://example.com/population.csv"

[report]
bucket = "test-output"
database = "testdb"
query = "SELECT 1"
output_prefix = "results"
report_name = "report.csv"
poll_timeout_secs = 30
"#
        .parse::<DocumentMut>()
        .unwrap();
        let config = Configuration::from_doc(&doc).unwrap();

        assert_eq!(config.acquire.bucket, "test-bucket");
        assert_eq!(config.acquire.sources.len(), 1);
        assert_eq!(config.acquire.sources[0].key, "population/test.csv");
        assert_eq!(config.acquire.income.key, "income/test.csv");
        assert_eq!(config.report.bucket, "test-output");
        assert_eq!(config.report.query, "SELECT 1");
        assert_eq!(config.report.result_key("id"), "results/id.csv");
        assert_eq!(config.report.report_key(), "results/report.csv");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let doc = "unrelated = true\n[acquire]\nfuture_option = 1\n"
            .parse::<DocumentMut>()
            .unwrap();
        let config = Configuration::from_doc(&doc).unwrap();
        assert_eq!(config.acquire.bucket, "california-data-test");
    }

    #[test]
    fn wrongly_typed_values_are_errors() {
        let doc = "[acquire]\nbucket = 3\n".parse::<DocumentMut>().unwrap();
        let err = Configuration::from_doc(&doc).unwrap_err();
        assert!(err.to_string().contains("acquire.bucket"));
    }

    #[test]
    fn from_path_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[acquire]\nbucket = \"file-bucket\"").unwrap();
        let config = Configuration::from_path(file.path()).unwrap();
        assert_eq!(config.acquire.bucket, "file-bucket");
    }
}
