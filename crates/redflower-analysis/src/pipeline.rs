use std::path::Path;

use redflower_config::{RedflowerConfig, load_workspace_config};
use redflower_core::{AggregateRow, EnrichedEvent, NarrativeRow, OrgSummaryRow, Table};
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::enrich::{EnrichedLayout, enrich};
use crate::error::{PipelineError, SchemaError};
use crate::narrate::narrate_with_suffix;
use crate::org_summary::summarize_orgs;
use crate::schema::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnalyzeRequest {
    /// Overrides `[narrative].min_count` for this run.
    pub min_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub events_read: usize,
    pub events_retained: usize,
    pub events_dropped: usize,
    pub roster_entries: usize,
    pub roster_blank_ids: usize,
    pub duplicate_employee_ids: usize,
    pub distinct_recipients: usize,
    pub qualifying_recipients: usize,
    pub narrative_groups: usize,
    pub min_count: u32,
}

/// Everything one run produces. Owned by the caller; nothing is retained by
/// the analyzer between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub enriched: Vec<EnrichedEvent>,
    pub layout: EnrichedLayout,
    pub aggregate: Vec<AggregateRow>,
    pub narrative: Vec<NarrativeRow>,
    pub org_summary: Vec<OrgSummaryRow>,
    pub stats: RunStats,
}

#[derive(Debug, Clone)]
pub struct FlowerAnalyzer {
    config: RedflowerConfig,
}

impl FlowerAnalyzer {
    pub fn new(config: RedflowerConfig) -> Self {
        Self { config }
    }

    pub fn from_workspace(workspace: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let config = load_workspace_config(workspace)?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &RedflowerConfig {
        &self.config
    }

    pub fn validate(&self, events: &Table, roster: &Table) -> Vec<SchemaError> {
        validate(events, roster, &self.config.events, &self.config.roster)
    }

    /// Validates, then enriches, aggregates and narrates. Schema errors stop
    /// the run before any row is read; any later failure discards the run.
    pub fn analyze(
        &self,
        events: &Table,
        roster: &Table,
        request: AnalyzeRequest,
    ) -> Result<PipelineResult, PipelineError> {
        let schema_errors = self.validate(events, roster);
        if !schema_errors.is_empty() {
            for error in &schema_errors {
                tracing::warn!(table = error.table.as_str(), missing = ?error.missing, "schema check failed");
            }
            return Err(PipelineError::Schema(schema_errors));
        }

        let min_count = request.min_count.unwrap_or(self.config.narrative.min_count);

        let enrichment = enrich(
            events,
            roster,
            &self.config.events,
            &self.config.roster,
            &self.config.output.columns,
        )?;
        let aggregate = aggregate(&enrichment.events);
        let narrative =
            narrate_with_suffix(&aggregate, min_count, &self.config.narrative.unit_suffix);
        let org_summary = summarize_orgs(&enrichment.events);

        let stats = RunStats {
            events_read: enrichment.stats.events_read,
            events_retained: enrichment.stats.events_retained,
            events_dropped: enrichment.stats.events_dropped,
            roster_entries: enrichment.stats.roster_entries,
            roster_blank_ids: enrichment.stats.roster_blank_ids,
            duplicate_employee_ids: enrichment.stats.duplicate_employee_ids,
            distinct_recipients: aggregate.len(),
            qualifying_recipients: aggregate.iter().filter(|row| row.count >= min_count).count(),
            narrative_groups: narrative.len(),
            min_count,
        };

        tracing::info!(
            recipients = stats.distinct_recipients,
            qualifying = stats.qualifying_recipients,
            narrative_groups = stats.narrative_groups,
            "analysis complete"
        );

        Ok(PipelineResult {
            enriched: enrichment.events,
            layout: enrichment.layout,
            aggregate,
            narrative,
            org_summary,
            stats,
        })
    }
}
