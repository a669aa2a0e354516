//! Dependency initialization and wiring for the log indexer.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::{Cli, Settings, SourceMode};
use crate::IndexingError;
use log_indexer_ingest::{
    BulkLoader, EndpointConfig, EndpointSource, FileSource, IndexProvisioner, LoaderConfig,
    Pipeline, PipelineTarget, Source, TransformConfig, Transformer,
};
use log_indexer_repository::{OpenSearchSink, SearchSink};
use log_indexer_shared::IndexSchema;
use serde_json::Value;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured pipeline ready to run.
    pub pipeline: Pipeline,
}

impl Dependencies {
    /// Initialize all dependencies from the command line and the environment.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If configuration is missing or the sink is unreachable
    pub async fn new(cli: &Cli) -> Result<Self, IndexingError> {
        let mode = cli.source_mode()?;
        let settings = Settings::from_env(matches!(mode, SourceMode::Endpoint(_)), cli.timeout())?;

        Self::with_settings(cli, settings).await
    }

    /// Initialize from already loaded settings.
    ///
    /// Command-line configuration is fully resolved before the sink is
    /// contacted, so a configuration error is reported even when the sink is
    /// down.
    pub async fn with_settings(cli: &Cli, settings: Settings) -> Result<Self, IndexingError> {
        let plan = PipelinePlan::from_cli(cli, &settings)?;

        info!(
            opensearch_url = %settings.sink.url,
            index = %cli.index,
            mappings = %cli.mappings,
            "Initializing dependencies"
        );

        let sink = OpenSearchSink::new(&settings.sink)?;

        // Verify OpenSearch is reachable
        let healthy = sink
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        Ok(Self {
            pipeline: plan.into_pipeline(Arc::new(sink)),
        })
    }
}

/// Every pipeline part resolved from the command line, waiting for a sink.
pub struct PipelinePlan {
    source: Source,
    transform: TransformConfig,
    loader: LoaderConfig,
    target: PipelineTarget,
    probe_query: Option<Value>,
}

impl PipelinePlan {
    /// Resolve every command-line option that does not need the sink.
    pub fn from_cli(cli: &Cli, settings: &Settings) -> Result<Self, IndexingError> {
        let schema = resolve_schema(&cli.mappings)?;
        let probe_query = cli.probe_query()?;
        let source = build_source(cli, settings)?;

        let mut transform = TransformConfig::default();
        if let Some(selector) = cli.selector() {
            transform = transform.with_selector(selector);
        }
        if let Some(root) = &cli.record_root {
            transform = transform.with_record_root(root.clone());
        }

        Ok(Self {
            source,
            transform,
            loader: LoaderConfig {
                chunk_size: cli.chunk_size,
                max_retries: cli.max_retries,
                ..LoaderConfig::default()
            },
            target: PipelineTarget::new(cli.index.clone(), schema),
            probe_query,
        })
    }

    /// Assemble the pipeline around a connected sink.
    pub fn into_pipeline(self, sink: Arc<dyn SearchSink>) -> Pipeline {
        let pipeline = Pipeline::new(
            self.source,
            Transformer::new(self.transform),
            IndexProvisioner::new(sink.clone()),
            BulkLoader::with_config(sink, self.loader),
            self.target,
        );

        match self.probe_query {
            Some(query) => pipeline.with_probe_query(query),
            None => pipeline,
        }
    }
}

fn build_source(cli: &Cli, settings: &Settings) -> Result<Source, IndexingError> {
    match cli.source_mode()? {
        SourceMode::File(path) => Ok(Source::from(FileSource::new(path))),
        SourceMode::Endpoint(url) => {
            let token = settings.source_token.as_deref().ok_or_else(|| {
                IndexingError::config("an API token is required for the endpoint source")
            })?;

            let config = EndpointConfig::new(url)
                .with_collection_key(cli.collection_key.clone())
                .with_header(cli.token_header.clone(), token)
                .with_timeout(cli.timeout());

            Ok(Source::from(EndpointSource::new(config)?))
        }
    }
}

/// Resolve `--mappings`: an existing file is read as JSON mappings, anything
/// else is looked up among the builtin schemas.
pub fn resolve_schema(mappings: &str) -> Result<IndexSchema, IndexingError> {
    let path = Path::new(mappings);
    if path.is_file() {
        let text = std::fs::read_to_string(path)?;
        return IndexSchema::from_json_str(&text)
            .map_err(|e| IndexingError::config(format!("{}: {}", path.display(), e)));
    }

    IndexSchema::builtin(mappings).map_err(|e| IndexingError::config(e.to_string()))
}
