use crate::domain::model::{
    BillState, ItemId, LineItem, NormalizeNote, Normalized, Participant, ParticipantId,
};
use crate::domain::ports::IdentifierSource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

/// What to do with a name listed on an item but missing from `names`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum UnmatchedNamePolicy {
    Drop,
    #[default]
    Warn,
    Create,
}

impl std::fmt::Display for UnmatchedNamePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnmatchedNamePolicy::Drop => f.write_str("drop"),
            UnmatchedNamePolicy::Warn => f.write_str("warn"),
            UnmatchedNamePolicy::Create => f.write_str("create"),
        }
    }
}

/// An extraction result exactly as received. Nothing about its shape is trusted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBill {
    document: Option<Map<String, Value>>,
}

impl RawBill {
    /// Never fails: unparseable text or a non-object document yields an empty bill.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                tracing::debug!("Extraction output is not valid JSON: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self {
                document: Some(map),
            },
            other => {
                tracing::debug!("Extraction output is not a JSON object: {}", other);
                Self::default()
            }
        }
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.document.as_ref().and_then(|doc| doc.get(key))
    }

    fn names(&self) -> Vec<&str> {
        string_list(self.field("names"))
    }

    fn items(&self) -> Vec<&Map<String, Value>> {
        match self.field("items") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Reads a number that may arrive as a JSON number or a string such as
/// `"12.50"` or `"$1,200"`. Anything else becomes NaN.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
            unsigned
                .replace(',', "")
                .trim()
                .parse::<f64>()
                .unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// Costs below zero are treated as unreadable so the calculator asks for one.
fn item_cost(value: Option<&Value>, index: usize) -> f64 {
    let cost = coerce_number(value);
    if cost < 0.0 {
        tracing::warn!("Item {} has a negative cost {}; leaving it unset", index + 1, cost);
        return f64::NAN;
    }
    cost
}

pub struct Normalizer<'a> {
    ids: &'a dyn IdentifierSource,
    policy: UnmatchedNamePolicy,
}

impl<'a> Normalizer<'a> {
    pub fn new(ids: &'a dyn IdentifierSource, policy: UnmatchedNamePolicy) -> Self {
        Self { ids, policy }
    }

    pub fn normalize(&self, raw: &RawBill) -> Normalized {
        let mut notes = Vec::new();
        let mut participants: Vec<Participant> = Vec::new();
        let mut by_name: HashMap<String, ParticipantId> = HashMap::new();

        for name in raw.names() {
            if name.is_empty() || by_name.contains_key(name) {
                continue;
            }
            let id = ParticipantId::new(self.ids.next_id());
            by_name.insert(name.to_string(), id.clone());
            participants.push(Participant {
                id,
                display_name: name.to_string(),
            });
        }

        let mut items = Vec::new();
        for (index, raw_item) in raw.items().into_iter().enumerate() {
            let mut participant_ids = BTreeSet::new();

            for name in string_list(raw_item.get("names")) {
                if let Some(id) = by_name.get(name) {
                    participant_ids.insert(id.clone());
                    continue;
                }

                match self.policy {
                    UnmatchedNamePolicy::Drop => {
                        tracing::debug!("Dropping unknown name '{}' from item {}", name, index + 1);
                    }
                    UnmatchedNamePolicy::Warn => {
                        tracing::warn!("Item {} names unknown participant '{}'", index + 1, name);
                        notes.push(NormalizeNote::UnmatchedName {
                            item: index,
                            name: name.to_string(),
                        });
                    }
                    UnmatchedNamePolicy::Create if !name.is_empty() => {
                        let id = ParticipantId::new(self.ids.next_id());
                        by_name.insert(name.to_string(), id.clone());
                        participants.push(Participant {
                            id: id.clone(),
                            display_name: name.to_string(),
                        });
                        participant_ids.insert(id);
                        notes.push(NormalizeNote::CreatedParticipant {
                            name: name.to_string(),
                        });
                    }
                    UnmatchedNamePolicy::Create => {}
                }
            }

            items.push(LineItem {
                id: ItemId::new(self.ids.next_id()),
                label: raw_item
                    .get("itemName")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                cost: item_cost(raw_item.get("cost"), index),
                participant_ids,
            });
        }

        let total = match raw.field("total") {
            None | Some(Value::Null) => None,
            value => Some(coerce_number(value)),
        };

        let state = BillState {
            total,
            participants,
            items,
        };

        if state.is_empty() {
            tracing::warn!("Nothing could be extracted from the input");
            notes.insert(0, NormalizeNote::ParseFailed);
        }

        tracing::debug!(
            "Normalized bill: {} participants, {} items, total {:?}",
            state.participants.len(),
            state.items.len(),
            state.total
        );

        Normalized { state, notes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ids::SequentialIds;
    use serde_json::json;

    fn normalize(value: Value, policy: UnmatchedNamePolicy) -> Normalized {
        let ids = SequentialIds::new("id");
        Normalizer::new(&ids, policy).normalize(&RawBill::from_value(value))
    }

    #[test]
    fn test_empty_object_yields_empty_bill_with_note() {
        let normalized = normalize(json!({}), UnmatchedNamePolicy::Warn);

        assert_eq!(normalized.state, BillState::default());
        assert_eq!(normalized.notes, vec![NormalizeNote::ParseFailed]);
    }

    #[test]
    fn test_invalid_json_matches_empty_object() {
        let ids = SequentialIds::new("id");
        let normalizer = Normalizer::new(&ids, UnmatchedNamePolicy::Warn);

        let from_garbage = normalizer.normalize(&RawBill::parse("sorry, I can't help with that"));
        let from_array = normalizer.normalize(&RawBill::parse("[1, 2]"));

        assert!(from_garbage.state.is_empty());
        assert_eq!(from_garbage.notes, vec![NormalizeNote::ParseFailed]);
        assert_eq!(from_array.notes, vec![NormalizeNote::ParseFailed]);
    }

    #[test]
    fn test_full_document() {
        let normalized = normalize(
            json!({
                "names": ["jack", "jill"],
                "total": 105,
                "items": [
                    { "cost": 20, "names": ["jack", "jill"] },
                    { "itemName": "salmon", "cost": "25", "names": ["jill"] },
                    { "itemName": "two drinks", "cost": 30.5, "names": ["jack"] }
                ]
            }),
            UnmatchedNamePolicy::Warn,
        );

        let state = &normalized.state;
        assert!(normalized.notes.is_empty());
        assert_eq!(state.total, Some(105.0));
        assert_eq!(state.participants.len(), 2);
        assert_eq!(state.participants[0].display_name, "jack");
        assert_eq!(state.items.len(), 3);
        assert_eq!(state.items[0].label, "");
        assert_eq!(state.items[0].participant_ids.len(), 2);
        assert_eq!(state.items[1].label, "salmon");
        assert_eq!(state.items[1].cost, 25.0);
        assert_eq!(state.items[2].cost, 30.5);

        let jill = &state.participants[1].id;
        assert!(state.items[1].participant_ids.contains(jill));
    }

    #[test]
    fn test_ids_are_unique() {
        let normalized = normalize(
            json!({
                "names": ["a", "b", "c"],
                "items": [{ "cost": 1, "names": ["a"] }, { "cost": 2, "names": ["b"] }]
            }),
            UnmatchedNamePolicy::Warn,
        );

        let mut seen = std::collections::HashSet::new();
        for p in &normalized.state.participants {
            assert!(seen.insert(p.id.to_string()));
        }
        for i in &normalized.state.items {
            assert!(seen.insert(i.id.to_string()));
        }
    }

    #[test]
    fn test_duplicate_input_names_collapse() {
        let normalized = normalize(json!({ "names": ["sam", "sam", "", "alex"] }), UnmatchedNamePolicy::Warn);

        let names: Vec<_> = normalized
            .state
            .participants
            .iter()
            .map(|p| p.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["sam", "alex"]);
    }

    #[test]
    fn test_uncoercible_numbers_become_nan() {
        let normalized = normalize(
            json!({
                "names": ["a"],
                "total": "about forty",
                "items": [{ "cost": true, "names": ["a"] }, { "names": ["a"] }]
            }),
            UnmatchedNamePolicy::Warn,
        );

        assert!(normalized.state.total.unwrap().is_nan());
        assert!(normalized.state.items[0].cost.is_nan());
        assert!(normalized.state.items[1].cost.is_nan());
    }

    #[test]
    fn test_negative_cost_becomes_unset() {
        let normalized = normalize(
            json!({
                "names": ["a", "b"],
                "total": 10,
                "items": [{ "cost": 20, "names": ["a"] }, { "cost": "-15", "names": ["b"] }]
            }),
            UnmatchedNamePolicy::Warn,
        );

        assert_eq!(normalized.state.items[0].cost, 20.0);
        assert!(normalized.state.items[1].cost.is_nan());
        assert_eq!(
            crate::core::calculator::calculate(&normalized.state),
            Err(crate::utils::error::SplitValidationError::MissingItemCost)
        );
    }

    #[test]
    fn test_null_total_is_absent() {
        let normalized = normalize(json!({ "names": ["a"], "total": null }), UnmatchedNamePolicy::Warn);
        assert_eq!(normalized.state.total, None);
    }

    #[test]
    fn test_coerce_number_strings() {
        assert_eq!(coerce_number(Some(&json!("12.50"))), 12.5);
        assert_eq!(coerce_number(Some(&json!(" $1,200 "))), 1200.0);
        assert_eq!(coerce_number(Some(&json!(7))), 7.0);
        assert!(coerce_number(Some(&json!("twelve"))).is_nan());
        assert!(coerce_number(Some(&json!(null))).is_nan());
        assert!(coerce_number(None).is_nan());
    }

    #[test]
    fn test_unmatched_name_warn_policy() {
        let normalized = normalize(
            json!({
                "names": ["eric"],
                "total": 10,
                "items": [{ "cost": 10, "names": ["eric", "taia"] }]
            }),
            UnmatchedNamePolicy::Warn,
        );

        assert_eq!(normalized.state.items[0].participant_ids.len(), 1);
        assert_eq!(
            normalized.notes,
            vec![NormalizeNote::UnmatchedName {
                item: 0,
                name: "taia".to_string()
            }]
        );
    }

    #[test]
    fn test_unmatched_name_drop_policy() {
        let normalized = normalize(
            json!({
                "names": ["eric"],
                "items": [{ "cost": 10, "names": ["taia"] }]
            }),
            UnmatchedNamePolicy::Drop,
        );

        assert!(normalized.state.items[0].participant_ids.is_empty());
        assert!(normalized.notes.is_empty());
    }

    #[test]
    fn test_unmatched_name_create_policy() {
        let normalized = normalize(
            json!({
                "names": ["eric"],
                "items": [
                    { "cost": 10, "names": ["taia"] },
                    { "cost": 5, "names": ["taia", "eric"] }
                ]
            }),
            UnmatchedNamePolicy::Create,
        );

        let state = &normalized.state;
        assert_eq!(state.participants.len(), 2);
        let taia = &state.participant_by_name("taia").unwrap().id;
        assert!(state.items[0].participant_ids.contains(taia));
        assert!(state.items[1].participant_ids.contains(taia));
        assert_eq!(
            normalized.notes,
            vec![NormalizeNote::CreatedParticipant {
                name: "taia".to_string()
            }]
        );
    }
}
