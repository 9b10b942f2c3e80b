// Public modules
pub mod artifact;
pub mod config;
pub mod error;
pub mod generator;
pub mod http;
pub mod manifest;
pub mod pipeline;
pub mod postprocess;
pub mod prune;
pub mod retention;
pub mod version;

// Re-export common types for convenience
pub use artifact::{ArtifactCache, ArtifactRecord};
pub use config::DatagenConfig;
pub use error::{Error, ErrorCode, Result};
pub use generator::{Exporter, JavaExporter};
pub use http::{HttpTransport, Transport};
pub use pipeline::{RunSummary, VersionOutcome, VersionState};
pub use prune::PruneReport;
pub use retention::RetentionSet;
pub use version::SupportedVersion;
