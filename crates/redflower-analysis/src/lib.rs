mod aggregate;
mod enrich;
mod error;
mod export;
mod narrate;
mod org_summary;
mod pipeline;
mod roster;
mod schema;

pub use aggregate::aggregate;
pub use enrich::{EnrichStats, EnrichedLayout, EnrichedSlot, Enrichment, enrich};
pub use error::{PipelineError, ProcessingError, SchemaError};
pub use export::{Artifact, ArtifactTables};
pub use narrate::{narrate, narrate_default, narrate_with_suffix};
pub use org_summary::summarize_orgs;
pub use pipeline::{AnalyzeRequest, FlowerAnalyzer, PipelineResult, RunStats};
pub use roster::RosterLookup;
pub use schema::validate;
