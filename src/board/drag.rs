//! Drag session state machine and drop policy.
//!
//! The drag primitive (pointer/keyboard sensors, collision detection) lives
//! in the host. This module only sees the events it produces:
//! `begin(active_id)` when a card is picked up and
//! `end(active_id, over_id)` when the gesture finishes.

use std::str::FromStr;

use serde::Serialize;

use super::models::{Opportunity, PipelineStage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { active_id: String },
}

/// Why a drop did not produce a transition. None of these are errors: the
/// card simply returns to its original bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropRejection {
    NoTarget,
    InvalidTarget { target: String },
    UnknownOpportunity { opportunity_id: String },
    SameStage { stage: PipelineStage },
    Locked { opportunity_id: String },
}

impl std::fmt::Display for DropRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTarget => write!(f, "dropped outside any stage"),
            Self::InvalidTarget { target } => write!(f, "'{}' is not a pipeline stage", target),
            Self::UnknownOpportunity { opportunity_id } => {
                write!(f, "opportunity {} is not on the board", opportunity_id)
            }
            Self::SameStage { stage } => write!(f, "already in {}", stage),
            Self::Locked { opportunity_id } => write!(f, "opportunity {} is locked", opportunity_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropDecision {
    Rejected(DropRejection),
    Move {
        opportunity: Opportunity,
        from: PipelineStage,
        to: PipelineStage,
    },
}

/// The per-card "disabled" flag handed to the drag primitive.
pub fn is_draggable(opportunity: &Opportunity) -> bool {
    !opportunity.is_locked
}

/// Decide what a drop means against the authoritative list.
///
/// Checks run in a fixed order; the lock check is repeated here even though
/// locked cards are not draggable in the first place.
pub fn evaluate_drop(
    active_id: &str,
    over: Option<&str>,
    authoritative: &[Opportunity],
) -> DropDecision {
    let Some(over) = over else {
        return DropDecision::Rejected(DropRejection::NoTarget);
    };
    let Ok(target) = PipelineStage::from_str(over) else {
        return DropDecision::Rejected(DropRejection::InvalidTarget {
            target: over.to_string(),
        });
    };
    let Some(opportunity) = authoritative.iter().find(|opp| opp.id == active_id) else {
        return DropDecision::Rejected(DropRejection::UnknownOpportunity {
            opportunity_id: active_id.to_string(),
        });
    };
    if opportunity.pipeline_stage == target {
        return DropDecision::Rejected(DropRejection::SameStage { stage: target });
    }
    if opportunity.is_locked {
        return DropDecision::Rejected(DropRejection::Locked {
            opportunity_id: active_id.to_string(),
        });
    }
    DropDecision::Move {
        opportunity: opportunity.clone(),
        from: opportunity.pipeline_stage,
        to: target,
    }
}

/// Single-slot drag tracker: `Idle -> Dragging(id) -> Idle`.
#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { active_id } => Some(active_id),
        }
    }

    pub fn begin(&mut self, active_id: impl Into<String>) {
        let active_id = active_id.into();
        if let DragState::Dragging { active_id: previous } = &self.state {
            tracing::debug!(previous = %previous, next = %active_id, "drag replaced before drop");
        }
        self.state = DragState::Dragging { active_id };
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Finish the gesture. The session is idle afterwards whatever the outcome.
    pub fn end(
        &mut self,
        active_id: &str,
        over: Option<&str>,
        authoritative: &[Opportunity],
    ) -> DropDecision {
        self.state = DragState::Idle;
        evaluate_drop(active_id, over, authoritative)
    }
}
