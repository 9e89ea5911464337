use redflower_config::{EventColumns, OutputColumns, RosterConfig};
use redflower_core::{EnrichedEvent, Table, TableKind, normalize_id};
use serde::{Deserialize, Serialize};

use crate::error::ProcessingError;
use crate::roster::{RosterLookup, require_column};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichedSlot {
    Source(usize),
    RecipientOrg3,
    RecipientOrg4,
    RecipientAlias,
    SenderOrg3,
    SenderOrg4,
}

/// Column layout of the enriched events export. Derived columns sit next to
/// the input column they describe; all other input columns keep their order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedLayout {
    pub headers: Vec<String>,
    pub slots: Vec<EnrichedSlot>,
}

impl EnrichedLayout {
    fn build(
        events: &Table,
        recipient_col: usize,
        sender_col: usize,
        name_col: usize,
        labels: &OutputColumns,
    ) -> Self {
        let mut layout = Self {
            headers: Vec::with_capacity(events.headers.len() + 5),
            slots: Vec::with_capacity(events.headers.len() + 5),
        };

        for (index, header) in events.headers.iter().enumerate() {
            layout.push(header, EnrichedSlot::Source(index));
            if index == recipient_col {
                layout.push(&labels.recipient_org3, EnrichedSlot::RecipientOrg3);
                layout.push(&labels.recipient_org4, EnrichedSlot::RecipientOrg4);
            }
            if index == name_col {
                layout.push(&labels.recipient_alias, EnrichedSlot::RecipientAlias);
            }
            if index == sender_col {
                layout.push(&labels.sender_org3, EnrichedSlot::SenderOrg3);
                layout.push(&labels.sender_org4, EnrichedSlot::SenderOrg4);
            }
        }

        layout
    }

    fn push(&mut self, header: &str, slot: EnrichedSlot) {
        self.headers.push(header.to_owned());
        self.slots.push(slot);
    }

    pub fn render(&self, event: &EnrichedEvent) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| match slot {
                EnrichedSlot::Source(index) => event.source.get(*index).cloned().unwrap_or_default(),
                EnrichedSlot::RecipientOrg3 => event.recipient_org3.clone(),
                EnrichedSlot::RecipientOrg4 => event.recipient_org4.clone(),
                EnrichedSlot::RecipientAlias => event.recipient_alias.clone(),
                EnrichedSlot::SenderOrg3 => event.sender_org3.clone(),
                EnrichedSlot::SenderOrg4 => event.sender_org4.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EnrichStats {
    pub events_read: usize,
    pub events_retained: usize,
    pub events_dropped: usize,
    pub roster_entries: usize,
    pub roster_blank_ids: usize,
    pub duplicate_employee_ids: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub events: Vec<EnrichedEvent>,
    pub layout: EnrichedLayout,
    pub stats: EnrichStats,
}

/// Joins events to the roster on recipient id. Events whose recipient is not
/// on the roster are dropped; unknown senders get empty org columns.
pub fn enrich(
    events: &Table,
    roster: &Table,
    event_columns: &EventColumns,
    roster_config: &RosterConfig,
    labels: &OutputColumns,
) -> Result<Enrichment, ProcessingError> {
    events
        .ensure_rectangular()
        .map_err(|source| ProcessingError::MalformedTable {
            table: TableKind::Events,
            source,
        })?;

    let recipient_col = require_column(TableKind::Events, events, &event_columns.recipient_id)?;
    let sender_col = require_column(TableKind::Events, events, &event_columns.sender_id)?;
    let name_col = require_column(TableKind::Events, events, &event_columns.recipient_name)?;

    if let Some(column) = labels
        .enrichment_labels()
        .into_iter()
        .find(|label| events.has_column(label))
    {
        return Err(ProcessingError::ColumnConflict {
            column: column.to_owned(),
        });
    }

    let lookup = RosterLookup::build(roster, roster_config)?;
    if lookup.is_empty() && !events.is_empty() {
        tracing::warn!("roster has no usable employee ids, every event will be dropped");
    }
    let layout = EnrichedLayout::build(events, recipient_col, sender_col, name_col, labels);

    let mut enriched = Vec::with_capacity(events.len());
    for row in &events.rows {
        let recipient_id = normalize_id(&row[recipient_col]);
        let Some(recipient) = lookup.get(&recipient_id) else {
            continue;
        };

        let sender_id = normalize_id(&row[sender_col]);
        let (sender_org3, sender_org4) = lookup
            .get(&sender_id)
            .map(|sender| (sender.org_level3.clone(), sender.org_level4.clone()))
            .unwrap_or_default();

        enriched.push(EnrichedEvent {
            recipient_id,
            sender_id,
            recipient_name: row[name_col].trim().to_owned(),
            recipient_org3: recipient.org_level3.clone(),
            recipient_org4: recipient.org_level4.clone(),
            recipient_alias: recipient.alias.clone(),
            sender_org3,
            sender_org4,
            source: row.clone(),
        });
    }

    let stats = EnrichStats {
        events_read: events.len(),
        events_retained: enriched.len(),
        events_dropped: events.len() - enriched.len(),
        roster_entries: lookup.len(),
        roster_blank_ids: lookup.blank_id_rows(),
        duplicate_employee_ids: lookup.duplicate_ids().len(),
    };

    if stats.events_dropped > 0 {
        tracing::warn!(
            dropped = stats.events_dropped,
            "events with recipients missing from roster were dropped"
        );
    }
    tracing::info!(
        events_read = stats.events_read,
        events_retained = stats.events_retained,
        roster_entries = stats.roster_entries,
        "enriched events"
    );

    Ok(Enrichment {
        events: enriched,
        layout,
        stats,
    })
}
