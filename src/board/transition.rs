//! Optimistic stage transitions and their rollback path.

use serde::Serialize;

use super::drag::DropRejection;
use super::grouping::GroupedOpportunities;
use super::models::{Opportunity, PipelineStage};

/// Outcome of one drop, as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum TransitionResult {
    /// Nothing changed: cancelled gesture, stray target, no-op or locked card.
    Ignored(DropRejection),
    /// The backend accepted the move; carries its canonical record.
    Applied(Opportunity),
    /// The record is not backed by the store, so the local move is final.
    LocalOnly(Opportunity),
    /// The backend refused; the board was regrouped from the authoritative list.
    RolledBack {
        opportunity_id: String,
        stage: PipelineStage,
        reason: String,
    },
}

impl TransitionResult {
    pub fn is_move(&self) -> bool {
        matches!(self, Self::Applied(_) | Self::LocalOnly(_))
    }
}

/// A move that has been applied locally and still awaits the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransition {
    pub opportunity_id: String,
    pub from: PipelineStage,
    pub to: PipelineStage,
}

/// First half of a drop: either already settled, or waiting on a persist call.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedTransition {
    Settled(TransitionResult),
    Pending(PendingTransition),
}

/// Move `opportunity` into `target` on a copy of `grouped`.
///
/// The record is removed by id from whichever bucket currently shows it, so a
/// card that already moved optimistically is never duplicated. A copy with the
/// new stage is appended to the end of the target bucket.
pub fn apply_move(
    grouped: &GroupedOpportunities,
    opportunity: &Opportunity,
    target: PipelineStage,
) -> (GroupedOpportunities, Opportunity) {
    let mut next = grouped.clone();
    next.remove(&opportunity.id);
    let mut moved = opportunity.clone();
    moved.pipeline_stage = target;
    next.push(moved.clone());
    (next, moved)
}

/// Discard any optimistic state and regroup from the authoritative list.
pub fn rollback(authoritative: &[Opportunity]) -> GroupedOpportunities {
    GroupedOpportunities::group(authoritative)
}
