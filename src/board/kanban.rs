use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use super::drag::{DragSession, DropDecision, is_draggable};
use super::events::{BoardEvent, broadcast_event};
use super::grouping::GroupedOpportunities;
use super::models::{Opportunity, PipelineStage};
use super::transition::{
    PendingTransition, StagedTransition, TransitionResult, apply_move, rollback,
};
use crate::errors::PersistenceError;
use crate::gateway::StageGateway;

const EVENT_CAPACITY: usize = 256;

struct BoardState {
    /// Local mirror of the gateway's list; the last known-good snapshot.
    authoritative: Vec<Opportunity>,
    /// What the board displays, possibly ahead of `authoritative`.
    grouped: GroupedOpportunities,
    session: DragSession,
}

/// Kanban board over a stage gateway.
///
/// State sits behind a `std::sync::Mutex` that is only held for short
/// synchronous sections, never across the persist call, so other gestures
/// can run while a transition is in flight.
pub struct KanbanBoard {
    gateway: Arc<dyn StageGateway>,
    state: Mutex<BoardState>,
    events: broadcast::Sender<BoardEvent>,
}

impl KanbanBoard {
    pub fn new(gateway: Arc<dyn StageGateway>) -> Self {
        Self::with_opportunities(gateway, Vec::new())
    }

    pub fn with_opportunities(gateway: Arc<dyn StageGateway>, opportunities: Vec<Opportunity>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            gateway,
            state: Mutex::new(BoardState {
                grouped: GroupedOpportunities::group(&opportunities),
                authoritative: opportunities,
                session: DragSession::new(),
            }),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Fetch the list from the gateway and regroup from scratch.
    pub async fn reload(&self) -> Result<usize, PersistenceError> {
        let opportunities = self.gateway.fetch_opportunities().await?;
        let count = opportunities.len();
        self.replace_opportunities(opportunities);
        tracing::info!(count, "board reloaded");
        broadcast_event(&self.events, BoardEvent::BoardReloaded { count });
        Ok(count)
    }

    /// The authoritative list changed: drop any optimistic state and regroup.
    pub fn replace_opportunities(&self, opportunities: Vec<Opportunity>) {
        let mut state = self.lock();
        state.grouped = GroupedOpportunities::group(&opportunities);
        state.authoritative = opportunities;
    }

    pub fn grouped(&self) -> GroupedOpportunities {
        self.lock().grouped.clone()
    }

    pub fn opportunities(&self) -> Vec<Opportunity> {
        self.lock().authoritative.clone()
    }

    pub fn active_id(&self) -> Option<String> {
        self.lock().session.active_id().map(str::to_string)
    }

    /// Whether the card may be picked up; `false` for locked or unknown ids.
    pub fn is_draggable(&self, id: &str) -> bool {
        self.lock()
            .authoritative
            .iter()
            .find(|opp| opp.id == id)
            .is_some_and(is_draggable)
    }

    pub fn drag_start(&self, active_id: &str) {
        self.lock().session.begin(active_id);
    }

    pub fn drag_cancel(&self) {
        self.lock().session.cancel();
    }

    /// Card click passthrough.
    pub fn click(&self, id: &str) -> Option<Opportunity> {
        let opportunity = self.lock().grouped.find(id).cloned()?;
        broadcast_event(
            &self.events,
            BoardEvent::OpportunityClicked {
                opportunity: opportunity.clone(),
            },
        );
        Some(opportunity)
    }

    /// Finish a gesture: validate, apply optimistically, persist, and roll
    /// back on failure. Never returns an error; see [`TransitionResult`].
    pub async fn drag_end(&self, active_id: &str, over: Option<&str>) -> TransitionResult {
        match self.begin_transition(active_id, over) {
            StagedTransition::Settled(result) => result,
            StagedTransition::Pending(pending) => self.complete_transition(pending).await,
        }
    }

    /// Synchronous half of a drop. A legal move is applied to the displayed
    /// grouping and announced before this returns.
    pub fn begin_transition(&self, active_id: &str, over: Option<&str>) -> StagedTransition {
        let mut state = self.lock();
        let decision = {
            let BoardState {
                session,
                authoritative,
                ..
            } = &mut *state;
            session.end(active_id, over, authoritative)
        };

        let (opportunity, from, to) = match decision {
            DropDecision::Rejected(rejection) => {
                tracing::debug!(opportunity_id = %active_id, %rejection, "drop ignored");
                return StagedTransition::Settled(TransitionResult::Ignored(rejection));
            }
            DropDecision::Move {
                opportunity,
                from,
                to,
            } => (opportunity, from, to),
        };

        let (grouped, moved) = apply_move(&state.grouped, &opportunity, to);
        state.grouped = grouped;
        broadcast_event(
            &self.events,
            BoardEvent::OpportunityMoved {
                opportunity_id: opportunity.id.clone(),
                from_stage: from,
                to_stage: to,
            },
        );

        if !opportunity.persisted {
            // Nothing backs this record, so the local move is the final state.
            if let Some(record) = state
                .authoritative
                .iter_mut()
                .find(|opp| opp.id == opportunity.id)
            {
                record.pipeline_stage = to;
            }
            tracing::info!(
                opportunity_id = %opportunity.id,
                stage = %to,
                "skipping persist for unpersisted opportunity"
            );
            broadcast_event(
                &self.events,
                BoardEvent::TransitionSkipped {
                    opportunity_id: opportunity.id.clone(),
                    stage: to,
                },
            );
            return StagedTransition::Settled(TransitionResult::LocalOnly(moved));
        }

        StagedTransition::Pending(PendingTransition {
            opportunity_id: opportunity.id,
            from,
            to,
        })
    }

    /// Asynchronous half of a drop: persist and settle.
    pub async fn complete_transition(&self, pending: PendingTransition) -> TransitionResult {
        let result = self
            .gateway
            .update_stage(&pending.opportunity_id, pending.to)
            .await;

        match result {
            Ok(canonical) => {
                {
                    let mut state = self.lock();
                    match state
                        .authoritative
                        .iter_mut()
                        .find(|opp| opp.id == canonical.id)
                    {
                        Some(record) => {
                            *record = canonical.clone();
                            state.grouped.upsert(canonical.clone());
                        }
                        // The list was replaced while the persist was in flight.
                        None => tracing::debug!(
                            opportunity_id = %canonical.id,
                            "persisted record no longer on the board"
                        ),
                    }
                }
                tracing::debug!(
                    opportunity_id = %canonical.id,
                    stage = %canonical.pipeline_stage,
                    "stage persisted"
                );
                broadcast_event(
                    &self.events,
                    BoardEvent::TransitionPersisted {
                        opportunity: canonical.clone(),
                    },
                );
                TransitionResult::Applied(canonical)
            }
            Err(err) => self.roll_back(pending, err),
        }
    }

    fn roll_back(&self, pending: PendingTransition, err: PersistenceError) -> TransitionResult {
        {
            let mut state = self.lock();
            state.grouped = rollback(&state.authoritative);
        }
        tracing::warn!(
            opportunity_id = %pending.opportunity_id,
            stage = %pending.to,
            error = %err,
            "failed to update opportunity stage, rolled back"
        );
        let reason = err.to_string();
        broadcast_event(
            &self.events,
            BoardEvent::TransitionRolledBack {
                opportunity_id: pending.opportunity_id.clone(),
                stage: pending.to,
                error: reason.clone(),
            },
        );
        TransitionResult::RolledBack {
            opportunity_id: pending.opportunity_id,
            stage: pending.to,
            reason,
        }
    }

    /// Stage the board currently displays for `id`.
    pub fn displayed_stage(&self, id: &str) -> Option<PipelineStage> {
        self.lock().grouped.stage_of(id)
    }
}
