use crate::core::calculator::{SplitCalculator, SplitOutcome};
use crate::domain::model::{BillState, ItemId, LineItem, Participant, ParticipantId};
use crate::domain::ports::IdentifierSource;
use crate::utils::error::{Result, SplitError};
use std::collections::BTreeSet;

/// The bill being edited, plus a version that moves on every change.
///
/// Splits are recomputed from the current state each time they are asked
/// for; nothing is cached between versions.
pub struct BillSession<I: IdentifierSource> {
    state: BillState,
    version: u64,
    ids: I,
}

impl<I: IdentifierSource> BillSession<I> {
    pub fn new(ids: I) -> Self {
        Self::from_state(BillState::default(), ids)
    }

    /// Starts editing a bill produced elsewhere, typically by the normalizer.
    pub fn from_state(state: BillState, ids: I) -> Self {
        Self {
            state,
            version: 0,
            ids,
        }
    }

    pub fn state(&self) -> &BillState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn into_state(self) -> BillState {
        self.state
    }

    pub fn split(&self, calculator: &SplitCalculator) -> SplitOutcome {
        calculator.calculate(&self.state)
    }

    pub fn set_total(&mut self, total: Option<f64>) {
        self.state.total = total;
        self.bump();
    }

    pub fn add_participant(&mut self, name: impl Into<String>) -> ParticipantId {
        let id = ParticipantId::new(self.ids.next_id());
        self.state.participants.push(Participant {
            id: id.clone(),
            display_name: name.into(),
        });
        self.bump();
        id
    }

    pub fn rename_participant(&mut self, id: &ParticipantId, name: impl Into<String>) -> Result<()> {
        let participant = self
            .state
            .participants
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| unknown("participant", id.as_str()))?;
        participant.display_name = name.into();
        self.bump();
        Ok(())
    }

    /// Removes the participant and their id from every item. Items stay.
    pub fn remove_participant(&mut self, id: &ParticipantId) -> Result<()> {
        let position = self
            .state
            .participants
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| unknown("participant", id.as_str()))?;
        self.state.participants.remove(position);
        for item in &mut self.state.items {
            item.participant_ids.remove(id);
        }
        self.bump();
        Ok(())
    }

    pub fn add_item(
        &mut self,
        label: impl Into<String>,
        cost: f64,
        participants: impl IntoIterator<Item = ParticipantId>,
    ) -> Result<ItemId> {
        let participant_ids: BTreeSet<ParticipantId> = participants.into_iter().collect();
        if let Some(missing) = participant_ids
            .iter()
            .find(|id| self.state.participant(id).is_none())
        {
            return Err(unknown("participant", missing.as_str()));
        }

        let id = ItemId::new(self.ids.next_id());
        self.state.items.push(LineItem {
            id: id.clone(),
            label: label.into(),
            cost,
            participant_ids,
        });
        self.bump();
        Ok(id)
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Result<()> {
        let position = self
            .state
            .items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| unknown("item", id.as_str()))?;
        self.state.items.remove(position);
        self.bump();
        Ok(())
    }

    pub fn set_item_label(&mut self, id: &ItemId, label: impl Into<String>) -> Result<()> {
        self.item_mut(id)?.label = label.into();
        self.bump();
        Ok(())
    }

    pub fn set_item_cost(&mut self, id: &ItemId, cost: f64) -> Result<()> {
        self.item_mut(id)?.cost = cost;
        self.bump();
        Ok(())
    }

    /// Adds the participant to the item, or takes them off it if already
    /// there. Returns whether they now share the item.
    pub fn toggle_item_participant(
        &mut self,
        item: &ItemId,
        participant: &ParticipantId,
    ) -> Result<bool> {
        if self.state.participant(participant).is_none() {
            return Err(unknown("participant", participant.as_str()));
        }
        let sharers = &mut self.item_mut(item)?.participant_ids;
        let shared = if sharers.remove(participant) {
            false
        } else {
            sharers.insert(participant.clone());
            true
        };
        self.bump();
        Ok(shared)
    }

    fn item_mut(&mut self, id: &ItemId) -> Result<&mut LineItem> {
        self.state
            .items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| unknown("item", id.as_str()))
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

fn unknown(kind: &'static str, id: &str) -> SplitError {
    SplitError::UnknownEntity {
        kind,
        id: id.to_string(),
    }
}
