//! # Log Indexer Ingest
//!
//! This crate provides the ingest components that pull records from an HTTP
//! endpoint or a log file and load them into a search sink.
//!
//! ## Architecture
//!
//! The ingest follows a Source-Processor-Loader pattern:
//!
//! 1. **Source**: Fetches raw items from an endpoint or a file
//! 2. **Processor**: Normalizes raw items into flat documents
//! 3. **Provisioner**: Creates the target index if it does not exist
//! 4. **Loader**: Writes documents to the sink in fixed-size bulk chunks
//! 5. **Orchestrator**: Runs one pipeline invocation end to end
//! 6. **Scheduler**: Repeats invocations on a fixed interval

pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod provisioner;
pub mod scheduler;
pub mod source;

pub use errors::{IngestError, ItemParseFailure, SchedulerError};
pub use loader::{BulkItemFailure, BulkLoader, ChunkOutcome, ChunkReport, LoadReport, LoaderConfig};
pub use orchestrator::{Pipeline, PipelineReport, PipelineTarget};
pub use processor::{TransformConfig, Transformer};
pub use provisioner::{IndexProvisioner, ProvisionOutcome};
pub use scheduler::{
    FailurePolicy, Iterations, Poller, Repetitions, Runner, ScheduleCanceller, ScheduleHandle,
    ScheduleOutcome, ScheduleState, ScheduleSummary,
};
pub use source::{EndpointConfig, EndpointSource, FileSource, Source, DEFAULT_COLLECTION_KEY};
