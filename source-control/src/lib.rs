//! Source-control Adapter (§4.A): normalises webhook deliveries, and reads
//! files/diffs/rules/branches from whichever provider a request names.

pub mod client;
pub mod comment;
pub mod errors;
pub mod github;
pub mod gitlab;
pub mod rules_yaml;
pub mod types;
pub mod webhook;

pub use client::{SourceControlClient, SourceControlConfig};
pub use errors::{Error, ProviderError, ScResult};
pub use types::{PrNumber, ProviderKind, RepoHandle, RequestDescriptor, normalize_ref};
pub use webhook::{parse_github, parse_gitlab};
