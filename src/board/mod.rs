//! Pipeline Kanban core: stage registry, grouping, drag gestures, and
//! optimistic stage transitions.
//!
//! ## Module Map
//!
//! | Module       | Responsibility                                            |
//! |--------------|-----------------------------------------------------------|
//! | `models`     | `Opportunity`, `PipelineStage` and wire types             |
//! | `registry`   | Category/stage layout, order, labels                      |
//! | `grouping`   | `GroupedOpportunities`: stage -> ordered cards            |
//! | `drag`       | `DragSession` state machine and drop validation           |
//! | `transition` | `TransitionResult`, optimistic move and rollback          |
//! | `kanban`     | `KanbanBoard`: ties the above to a `StageGateway`         |
//! | `events`     | `BoardEvent` broadcast to the presentation layer          |
//! | `filter`     | Filter bar (services, interest, days open, closing date)  |
//! | `demo`       | Seed records for running without a backend                |
//!
//! ```text
//! drag_start ──> DragSession ──drag_end──> evaluate_drop
//!                                              │ Move
//!                                              v
//!                         apply_move (optimistic, OpportunityMoved)
//!                                              │ persisted?
//!                          no ──> LocalOnly    │ yes
//!                                              v
//!                                 StageGateway::update_stage
//!                                   ok ──> Applied   err ──> rollback
//! ```

pub mod demo;
pub mod drag;
pub mod events;
pub mod filter;
pub mod grouping;
pub mod kanban;
pub mod models;
pub mod registry;
pub mod transition;

pub use drag::{DragSession, DragState, DropRejection};
pub use events::BoardEvent;
pub use filter::{OpportunityFilter, Selection};
pub use grouping::GroupedOpportunities;
pub use kanban::KanbanBoard;
pub use models::{Opportunity, PipelineCategory, PipelineStage, Temperature};
pub use transition::{StagedTransition, TransitionResult};
