//! Proportional bill splitting.
//!
//! Each item is shared equally by the people on it. Whatever the total adds
//! on top of the itemized subtotal (tax, tip, fees) is spread in proportion to
//! what each person itemized, so a person's final amount is
//! `their subtotal / grand subtotal * total`.

use crate::core::rounding::RoundingMode;
use crate::domain::model::{
    BillState, LineItem, MathRow, ParticipantId, ParticipantShare, RowKind, SplitBreakdown,
};
use crate::utils::error::SplitValidationError;
use std::collections::{HashMap, HashSet};

/// Absorbs float noise when comparing sums such as `0.1 + 0.2` against `0.3`.
pub const SUM_TOLERANCE: f64 = 1e-9;

pub type SplitOutcome = std::result::Result<SplitBreakdown, SplitValidationError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SplitCalculator {
    rounding: RoundingMode,
}

impl SplitCalculator {
    pub fn new(rounding: RoundingMode) -> Self {
        Self { rounding }
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    pub fn calculate(&self, state: &BillState) -> SplitOutcome {
        let total = validate(state)?;
        let participants = &state.participants;
        let count = participants.len();

        let index: HashMap<&ParticipantId, usize> = participants
            .iter()
            .enumerate()
            .map(|(i, p)| (&p.id, i))
            .collect();

        let mut math = Vec::with_capacity(state.items.len() + 4);
        let mut per_person = vec![0.0; count];
        let mut subtotal = 0.0;

        for (position, item) in state.items.iter().enumerate() {
            let mut values = vec![0.0; count];
            let sharers: Vec<usize> = item
                .participant_ids
                .iter()
                .filter_map(|id| index.get(id).copied())
                .collect();

            if !sharers.is_empty() {
                let unit_cost = item.cost / sharers.len() as f64;
                for i in sharers {
                    values[i] = unit_cost;
                    per_person[i] += unit_cost;
                }
            }
            subtotal += item.cost;

            math.push(MathRow {
                label: item_label(item, position),
                kind: RowKind::Item,
                total: item.cost,
                values,
            });
        }

        let proportions: Vec<f64> = if subtotal.abs() < SUM_TOLERANCE {
            // Nothing itemized: everyone carries the same share of the total.
            vec![1.0 / count as f64; count]
        } else {
            per_person.iter().map(|spent| spent / subtotal).collect()
        };

        let fee_gap = total - subtotal;
        let fees: Vec<f64> = proportions.iter().map(|p| p * fee_gap).collect();
        let split: Vec<f64> = proportions.iter().map(|p| p * total).collect();

        let output = participants
            .iter()
            .zip(&split)
            .map(|(p, amount)| ParticipantShare {
                participant_id: p.id.clone(),
                name: p.display_name.clone(),
                amount: self.rounding.round_currency(*amount),
            })
            .collect();

        math.push(MathRow {
            label: "Subtotal".to_string(),
            kind: RowKind::Subtotal,
            total: subtotal,
            values: per_person,
        });
        math.push(MathRow {
            label: "Proportion".to_string(),
            kind: RowKind::Proportion,
            total: proportions.iter().sum(),
            values: proportions,
        });
        math.push(MathRow {
            label: "Fees".to_string(),
            kind: RowKind::Fees,
            total: fee_gap,
            values: fees,
        });
        math.push(MathRow {
            label: "Split".to_string(),
            kind: RowKind::Split,
            total,
            values: split,
        });

        Ok(SplitBreakdown { output, math })
    }
}

/// Splits with the default rounding mode.
pub fn calculate(state: &BillState) -> SplitOutcome {
    SplitCalculator::default().calculate(state)
}

/// Runs every check in order and returns the validated total.
pub fn validate(state: &BillState) -> std::result::Result<f64, SplitValidationError> {
    let total = state
        .total
        .filter(|t| t.is_finite())
        .ok_or(SplitValidationError::MissingTotal)?;

    let mut seen = HashSet::with_capacity(state.participants.len());
    if !state
        .participants
        .iter()
        .all(|p| seen.insert(p.display_name.as_str()))
    {
        return Err(SplitValidationError::DuplicateParticipantName);
    }

    let mut subtotal = 0.0;
    for item in &state.items {
        if !item.cost.is_finite() || item.cost < 0.0 {
            return Err(SplitValidationError::MissingItemCost);
        }
        subtotal += item.cost;
    }

    if subtotal - total > SUM_TOLERANCE {
        return Err(SplitValidationError::SubtotalExceedsTotal);
    }

    for item in &state.items {
        validate_item_assignment(item)?;
        // ids that name nobody cannot carry a share
        let resolved = item
            .participant_ids
            .iter()
            .any(|id| state.participant(id).is_some());
        if item.cost > 0.0 && !resolved {
            return Err(SplitValidationError::UnassignedPositiveCostItem);
        }
    }

    Ok(total)
}

pub fn validate_item_assignment(item: &LineItem) -> std::result::Result<(), SplitValidationError> {
    if item.cost > 0.0 && item.participant_ids.is_empty() {
        return Err(SplitValidationError::UnassignedPositiveCostItem);
    }
    if item.cost.is_nan() && !item.participant_ids.is_empty() {
        return Err(SplitValidationError::UnsetItemCostWithParticipants);
    }
    Ok(())
}

pub fn item_label(item: &LineItem, position: usize) -> String {
    if item.label.trim().is_empty() {
        format!("item-{}", position + 1)
    } else {
        item.label.clone()
    }
}
