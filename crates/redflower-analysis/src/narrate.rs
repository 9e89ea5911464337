use redflower_config::{DEFAULT_MIN_COUNT, DEFAULT_UNIT_SUFFIX};
use redflower_core::{AggregateRow, NarrativeRow};

const NAME_SEPARATOR: &str = "、";
const CLUSTER_SEPARATOR: &str = "；";
const ORG_SEPARATOR: &str = "：";

/// Narrative with the default threshold policy and unit suffix.
pub fn narrate_default(aggregate: &[AggregateRow]) -> Vec<NarrativeRow> {
    narrate(aggregate, DEFAULT_MIN_COUNT)
}

pub fn narrate(aggregate: &[AggregateRow], min_count: u32) -> Vec<NarrativeRow> {
    narrate_with_suffix(aggregate, min_count, DEFAULT_UNIT_SUFFIX)
}

/// One row per distinct count at or above `min_count`, highest count first.
/// Members are ordered by (org3, name) here, whatever order `aggregate` has.
pub fn narrate_with_suffix(
    aggregate: &[AggregateRow],
    min_count: u32,
    unit_suffix: &str,
) -> Vec<NarrativeRow> {
    let mut qualifying = aggregate
        .iter()
        .filter(|row| row.count >= min_count)
        .collect::<Vec<_>>();
    qualifying.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.recipient_org3.cmp(&b.recipient_org3))
            .then_with(|| a.recipient_name.cmp(&b.recipient_name))
    });

    let rows = qualifying
        .chunk_by(|a, b| a.count == b.count)
        .map(|group| {
            let count = group[0].count;
            NarrativeRow {
                count,
                count_label: format!("{count}{unit_suffix}"),
                roster_text: roster_text(group),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        qualifying = qualifying.len(),
        groups = rows.len(),
        min_count,
        "composed narrative"
    );
    rows
}

fn roster_text(group: &[&AggregateRow]) -> String {
    group
        .chunk_by(|a, b| a.recipient_org3 == b.recipient_org3)
        .map(|cluster| {
            let names = cluster
                .iter()
                .map(|row| display_name(row))
                .collect::<Vec<_>>()
                .join(NAME_SEPARATOR);
            format!("{}{ORG_SEPARATOR}{names}", cluster[0].recipient_org3)
        })
        .collect::<Vec<_>>()
        .join(CLUSTER_SEPARATOR)
}

fn display_name(row: &AggregateRow) -> String {
    let alias = row.recipient_alias.trim();
    if alias.is_empty() {
        row.recipient_name.clone()
    } else {
        format!("{}（{alias}）", row.recipient_name)
    }
}
