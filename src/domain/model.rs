use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

entity_id!(ParticipantId);
entity_id!(ItemId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ItemId,
    pub label: String,
    /// NaN when the upstream value could not be read as a number.
    pub cost: f64,
    pub participant_ids: BTreeSet<ParticipantId>,
}

/// Input to the split calculator. Owned by whoever edits the bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillState {
    pub total: Option<f64>,
    pub participants: Vec<Participant>,
    pub items: Vec<LineItem>,
}

impl BillState {
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn participant_by_name(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.display_name == name)
    }

    pub fn item(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_none() && self.participants.is_empty() && self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Item,
    Subtotal,
    Proportion,
    Fees,
    Split,
}

/// One line of the audit table. `values` lines up index-for-index with
/// `BillState::participants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathRow {
    pub label: String,
    pub kind: RowKind,
    pub total: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantShare {
    pub participant_id: ParticipantId,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitBreakdown {
    pub output: Vec<ParticipantShare>,
    pub math: Vec<MathRow>,
}

impl SplitBreakdown {
    pub fn amount_for(&self, name: &str) -> Option<f64> {
        self.output
            .iter()
            .find(|share| share.name == name)
            .map(|share| share.amount)
    }

    pub fn output_map(&self) -> BTreeMap<String, f64> {
        self.output
            .iter()
            .map(|share| (share.name.clone(), share.amount))
            .collect()
    }

    pub fn row(&self, kind: RowKind) -> Option<&MathRow> {
        self.math.iter().find(|row| row.kind == kind)
    }

    pub fn item_rows(&self) -> impl Iterator<Item = &MathRow> {
        self.math.iter().filter(|row| row.kind == RowKind::Item)
    }

    pub fn participant_names(&self) -> Vec<&str> {
        self.output.iter().map(|share| share.name.as_str()).collect()
    }
}

/// Advisory messages produced while shaping an extracted bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NormalizeNote {
    ParseFailed,
    UnmatchedName { item: usize, name: String },
    CreatedParticipant { name: String },
}

impl fmt::Display for NormalizeNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeNote::ParseFailed => {
                f.write_str("Could not parse a bill from the input; fill in the details manually")
            }
            NormalizeNote::UnmatchedName { item, name } => write!(
                f,
                "Item {} mentions '{}', who is not in the list of names; they were left out of that item",
                item + 1,
                name
            ),
            NormalizeNote::CreatedParticipant { name } => {
                write!(f, "Added '{}' to the list of names", name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    pub state: BillState,
    pub notes: Vec<NormalizeNote>,
}

/// One call to the extraction service, kept for the interaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub input: String,
    pub output: String,
    pub model: String,
    pub latency_ms: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Everything produced for one bill description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitReport {
    pub state: BillState,
    pub notes: Vec<NormalizeNote>,
    pub outcome: std::result::Result<SplitBreakdown, crate::utils::error::SplitValidationError>,
}

impl SplitReport {
    pub fn breakdown(&self) -> Option<&SplitBreakdown> {
        self.outcome.as_ref().ok()
    }
}
