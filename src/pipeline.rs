use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::info;

use crate::config::{access_token, load_config, resolve_project_path, AppConfig};
use crate::csv_io::{read_input, write_output};
use crate::errors::{IbgeMatchError, Result};
use crate::http::HttpClient;
use crate::registry::{RegistryLoad, RegistryLoader};
use crate::report::{compute_stats, report_row, unavailable_row};
use crate::resolution::{build_index, MatchMethod, NameResolver, ResolutionStatus};
use crate::submit;
use crate::types::{InputRow, RegistryEntry, ReportRow, Stats};

/// Central orchestrator that wires the registry, the resolver, and the
/// report for one project.
pub struct Pipeline {
    config: AppConfig,
    project_root: PathBuf,
}

/// Per-run overrides of the configured paths.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Ignore the registry cache and refetch.
    pub refresh: bool,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Where the result CSV was written.
    pub output_path: PathBuf,
    pub rows: Vec<ReportRow>,
    pub stats: Stats,
    /// `false` when every row was reported as an API error.
    pub registry_available: bool,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Resolution of one ad-hoc name, for display.
#[derive(Debug, Clone)]
pub struct NameResolution {
    pub query: String,
    pub key: String,
    pub status: ResolutionStatus,
    pub entry: Option<RegistryEntry>,
    pub method: Option<MatchMethod>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl Pipeline {
    /// Creates a pipeline with an explicit configuration.
    pub fn new(project_root: &Path, config: AppConfig) -> Self {
        Self {
            config,
            project_root: project_root.to_path_buf(),
        }
    }

    /// Opens a project, loading `ibgematch.toml` if present.
    pub fn open(project_root: &Path) -> Result<Self> {
        let config = load_config(project_root)?;
        Ok(Self::new(project_root, config))
    }

    fn registry_loader(&self) -> RegistryLoader {
        let cache_path = resolve_project_path(&self.project_root, &self.config.registry.cache_file);
        RegistryLoader::new(self.config.registry.clone(), cache_path)
    }
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

impl Pipeline {
    /// Loads the registry from cache or network.
    pub fn load_registry(&self, refresh: bool) -> RegistryLoad {
        self.registry_loader().load(refresh)
    }

    /// Resolves every input row against the registry.
    ///
    /// The index is built once; when the registry is unavailable it is never
    /// built and every row is an API error.
    pub fn process(&self, rows: &[InputRow], registry: &RegistryLoad) -> Vec<ReportRow> {
        let entries = match registry {
            RegistryLoad::Available(entries) => entries,
            RegistryLoad::Unavailable { .. } => {
                return rows.iter().map(unavailable_row).collect();
            }
        };

        let index = build_index(entries.clone());
        let resolver = NameResolver::new(&index, self.config.matching.clone());

        rows.iter()
            .map(|row| report_row(row, &resolver.resolve_one(&row.name)))
            .collect()
    }

    /// Performs a full run: reads the input, loads the registry, resolves
    /// every row, writes the result file, and computes the statistics.
    pub fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        let start = Instant::now();

        let input_path = options
            .input
            .clone()
            .unwrap_or_else(|| resolve_project_path(&self.project_root, &self.config.input_csv));
        let output_path = options
            .output
            .clone()
            .unwrap_or_else(|| resolve_project_path(&self.project_root, &self.config.output_csv));

        let input = read_input(&input_path)?;
        let registry = self.load_registry(options.refresh);
        let rows = self.process(&input, &registry);

        write_output(&output_path, &rows)?;
        let stats = compute_stats(&rows);

        info!(
            rows = rows.len(),
            ok = stats.total_ok,
            not_found = stats.total_nao_encontrado,
            api_errors = stats.total_erro_api,
            "run complete"
        );

        Ok(RunSummary {
            output_path,
            rows,
            stats,
            registry_available: registry.is_available(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Resolves ad-hoc names against the registry.
    ///
    /// Unlike [`Pipeline::run`], an unavailable registry is an error here.
    pub fn resolve_names(&self, names: &[String], refresh: bool) -> Result<Vec<NameResolution>> {
        let entries = match self.load_registry(refresh) {
            RegistryLoad::Available(entries) => entries,
            RegistryLoad::Unavailable { reason } => {
                return Err(IbgeMatchError::Registry { message: reason })
            }
        };

        let index = build_index(entries);
        let resolver = NameResolver::new(&index, self.config.matching.clone());

        Ok(names
            .iter()
            .map(|name| {
                let outcome = resolver.resolve_one(name);
                NameResolution {
                    query: name.clone(),
                    key: crate::normalize::normalize(name),
                    status: outcome.status(),
                    entry: outcome.entry().cloned(),
                    method: outcome.method(),
                }
            })
            .collect())
    }

    /// Refetches the registry and rewrites the cache, returning the entry count.
    pub fn refresh_registry(&self) -> Result<usize> {
        match self.load_registry(true) {
            RegistryLoad::Available(entries) => Ok(entries.len()),
            RegistryLoad::Unavailable { reason } => Err(IbgeMatchError::Registry { message: reason }),
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

impl Pipeline {
    /// Picks the submission token for this project.
    pub fn access_token(&self, cli_token: Option<&str>) -> Option<String> {
        access_token(&self.project_root, cli_token, &self.config)
    }

    /// Posts the statistics to the configured grading endpoint.
    pub fn submit(&self, stats: &Stats, token: &str) -> Result<Value> {
        let timeout = Duration::from_secs(self.config.submit.timeout_secs);
        let connect_timeout = Duration::from_secs(self.config.registry.connect_timeout_secs);
        let client = HttpClient::new(timeout, connect_timeout);
        submit::submit(&client, &self.config.submit.url, stats, token)
    }
}
