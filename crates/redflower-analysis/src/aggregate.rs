use std::collections::BTreeMap;

use redflower_core::{AggregateRow, EnrichedEvent};

/// Grouping order for recipient ids. Integer ids compare by value and sort
/// ahead of any other id, which compares as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RecipientKey<'a> {
    Numeric(u64, &'a str),
    Text(&'a str),
}

impl<'a> RecipientKey<'a> {
    fn new(id: &'a str) -> Self {
        match id.parse::<u64>() {
            Ok(value) => Self::Numeric(value, id),
            Err(_) => Self::Text(id),
        }
    }
}

/// Counts events per recipient. Display attributes come from the first event
/// seen for that recipient. Rows are ordered by count descending, then org3
/// ascending; remaining ties keep ascending recipient id order.
pub fn aggregate(enriched: &[EnrichedEvent]) -> Vec<AggregateRow> {
    let mut groups = BTreeMap::<RecipientKey<'_>, AggregateRow>::new();

    for event in enriched {
        groups
            .entry(RecipientKey::new(&event.recipient_id))
            .and_modify(|row| row.count += 1)
            .or_insert_with(|| AggregateRow {
                recipient_id: event.recipient_id.clone(),
                recipient_name: event.recipient_name.clone(),
                recipient_alias: event.recipient_alias.clone(),
                recipient_org3: event.recipient_org3.clone(),
                recipient_org4: event.recipient_org4.clone(),
                count: 1,
            });
    }

    let mut rows = groups.into_values().collect::<Vec<_>>();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.recipient_org3.cmp(&b.recipient_org3))
    });

    tracing::debug!(recipients = rows.len(), "aggregated recipient counts");
    rows
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn event(recipient_id: &str, name: &str, org3: &str, alias: &str) -> EnrichedEvent {
        EnrichedEvent {
            recipient_id: recipient_id.to_owned(),
            sender_id: "S".to_owned(),
            recipient_name: name.to_owned(),
            recipient_org3: org3.to_owned(),
            recipient_org4: format!("{org3}-4"),
            recipient_alias: alias.to_owned(),
            sender_org3: String::new(),
            sender_org4: String::new(),
            source: Vec::new(),
        }
    }

    #[test]
    fn counts_and_sorts_by_count_then_org() {
        let mut enriched = Vec::new();
        enriched.extend((0..4).map(|_| event("E1", "Alice", "Sales", "Ace")));
        enriched.extend((0..2).map(|_| event("E3", "Bob", "Sales", "")));
        enriched.extend((0..2).map(|_| event("E4", "Cai", "Eng", "")));

        let rows = aggregate(&enriched);

        let summary = rows
            .iter()
            .map(|row| (row.recipient_id.as_str(), row.count, row.recipient_org3.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![("E1", 4, "Sales"), ("E4", 2, "Eng"), ("E3", 2, "Sales")]
        );
    }

    #[test]
    fn first_seen_attributes_are_carried_forward() {
        let enriched = vec![
            event("E1", "Alice", "Sales", "Ace"),
            event("E1", "Alicia", "Eng", "Other"),
        ];

        let rows = aggregate(&enriched);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].recipient_name, "Alice");
        assert_eq!(rows[0].recipient_alias, "Ace");
        assert_eq!(rows[0].recipient_org3, "Sales");
        assert_eq!(rows[0].recipient_org4, "Sales-4");
        assert_eq!(rows[0].count, 2);
    }

    #[test]
    fn full_ties_fall_back_to_recipient_id_order() {
        let enriched = vec![
            event("E9", "Zed", "Ops", ""),
            event("E2", "Amy", "Ops", ""),
            event("E5", "Kim", "Ops", ""),
        ];

        let ids = aggregate(&enriched)
            .into_iter()
            .map(|row| row.recipient_id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["E2", "E5", "E9"]);
    }

    #[test]
    fn numeric_ids_tie_in_numeric_order() {
        let enriched = vec![
            event("10", "Ten", "Ops", ""),
            event("9", "Nine", "Ops", ""),
            event("100", "Hundred", "Ops", ""),
            event("A7", "Text", "Ops", ""),
        ];

        let ids = aggregate(&enriched)
            .into_iter()
            .map(|row| row.recipient_id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["9", "10", "100", "A7"]);
    }

    #[test]
    fn aggregate_is_complete_and_ordered() {
        let ids = ["A", "B", "C", "D", "E"];
        let orgs = ["Ops", "Eng", "Sales"];
        let enriched = (0..37)
            .map(|i| {
                let id = ids[(i * 7) % ids.len()];
                let org = orgs[id.as_bytes()[0] as usize % orgs.len()];
                event(id, id, org, "")
            })
            .collect::<Vec<_>>();

        let rows = aggregate(&enriched);

        let total: u32 = rows.iter().map(|row| row.count).sum();
        assert_eq!(total as usize, enriched.len());

        let aggregated = rows
            .iter()
            .map(|row| row.recipient_id.as_str())
            .collect::<BTreeSet<_>>();
        let distinct = enriched
            .iter()
            .map(|event| event.recipient_id.as_str())
            .collect::<BTreeSet<_>>();
        assert_eq!(aggregated, distinct);
        assert_eq!(rows.len(), distinct.len());

        for pair in rows.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.count >= b.count);
            if a.count == b.count {
                assert!(a.recipient_org3 <= b.recipient_org3);
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_aggregate() {
        assert!(aggregate(&[]).is_empty());
    }
}
