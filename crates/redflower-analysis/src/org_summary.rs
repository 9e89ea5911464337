use std::collections::BTreeMap;

use redflower_core::{EnrichedEvent, OrgSummaryRow};

/// Recognitions received per recipient org3, most recognized first.
pub fn summarize_orgs(enriched: &[EnrichedEvent]) -> Vec<OrgSummaryRow> {
    let mut totals = BTreeMap::<&str, u32>::new();
    for event in enriched {
        *totals.entry(event.recipient_org3.as_str()).or_default() += 1;
    }

    let mut rows = totals
        .into_iter()
        .map(|(org3, total)| OrgSummaryRow {
            org3: org3.to_owned(),
            total,
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}
