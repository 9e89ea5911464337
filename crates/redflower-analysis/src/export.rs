use redflower_config::{EventColumns, OutputColumns};
use redflower_core::Table;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    EnrichedEvents,
    RecipientCounts,
    Narrative,
    OrgSummary,
}

impl Artifact {
    pub const ALL: [Artifact; 4] = [
        Self::EnrichedEvents,
        Self::RecipientCounts,
        Self::Narrative,
        Self::OrgSummary,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            Self::EnrichedEvents => "enriched_events",
            Self::RecipientCounts => "recipient_counts",
            Self::Narrative => "narrative",
            Self::OrgSummary => "org_summary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactTables {
    pub enriched_events: Table,
    pub recipient_counts: Table,
    pub narrative: Table,
    pub org_summary: Table,
}

impl ArtifactTables {
    pub fn get(&self, artifact: Artifact) -> &Table {
        match artifact {
            Artifact::EnrichedEvents => &self.enriched_events,
            Artifact::RecipientCounts => &self.recipient_counts,
            Artifact::Narrative => &self.narrative,
            Artifact::OrgSummary => &self.org_summary,
        }
    }
}

impl PipelineResult {
    /// Renders every artifact with the configured header labels. Recipient id
    /// and name keep the input labels of the events table.
    pub fn to_tables(&self, events: &EventColumns, labels: &OutputColumns) -> ArtifactTables {
        let enriched_events = Table::new(
            self.layout.headers.clone(),
            self.enriched
                .iter()
                .map(|event| self.layout.render(event))
                .collect(),
        );

        let recipient_counts = Table::new(
            headers(&[
                events.recipient_id.as_str(),
                events.recipient_name.as_str(),
                labels.recipient_alias.as_str(),
                labels.recipient_org3.as_str(),
                labels.recipient_org4.as_str(),
                labels.count.as_str(),
            ]),
            self.aggregate
                .iter()
                .map(|row| {
                    vec![
                        row.recipient_id.clone(),
                        row.recipient_name.clone(),
                        row.recipient_alias.clone(),
                        row.recipient_org3.clone(),
                        row.recipient_org4.clone(),
                        row.count.to_string(),
                    ]
                })
                .collect(),
        );

        let narrative = Table::new(
            headers(&[
                labels.count.as_str(),
                labels.count_label.as_str(),
                labels.roster_text.as_str(),
            ]),
            self.narrative
                .iter()
                .map(|row| {
                    vec![
                        row.count.to_string(),
                        row.count_label.clone(),
                        row.roster_text.clone(),
                    ]
                })
                .collect(),
        );

        let org_summary = Table::new(
            headers(&[labels.org3.as_str(), labels.total.as_str()]),
            self.org_summary
                .iter()
                .map(|row| vec![row.org3.clone(), row.total.to_string()])
                .collect(),
        );

        ArtifactTables {
            enriched_events,
            recipient_counts,
            narrative,
            org_summary,
        }
    }
}

fn headers(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|label| (*label).to_owned()).collect()
}
