use serde::Serialize;
use tokio::sync::broadcast;

use super::models::{Opportunity, PipelineStage};

/// Notifications the board publishes to its presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BoardEvent {
    /// Fired once per legal transition, before the persist call resolves.
    OpportunityMoved {
        opportunity_id: String,
        from_stage: PipelineStage,
        to_stage: PipelineStage,
    },
    OpportunityClicked {
        opportunity: Opportunity,
    },
    TransitionPersisted {
        opportunity: Opportunity,
    },
    TransitionSkipped {
        opportunity_id: String,
        stage: PipelineStage,
    },
    TransitionRolledBack {
        opportunity_id: String,
        stage: PipelineStage,
        error: String,
    },
    BoardReloaded {
        count: usize,
    },
}

pub fn broadcast_event(tx: &broadcast::Sender<BoardEvent>, event: BoardEvent) {
    let _ = tx.send(event); // Ignore error if no receivers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opportunity_moved_serialization() {
        let event = BoardEvent::OpportunityMoved {
            opportunity_id: "1".to_string(),
            from_stage: PipelineStage::LeadsInterest,
            to_stage: PipelineStage::ProspectQuote,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"OpportunityMoved\""));
        assert!(json.contains("\"opportunity_id\":\"1\""));
        assert!(json.contains("\"from_stage\":\"LEADS_INTEREST\""));
        assert!(json.contains("\"to_stage\":\"PROSPECT_QUOTE\""));
    }

    #[test]
    fn test_rolled_back_serialization() {
        let event = BoardEvent::TransitionRolledBack {
            opportunity_id: "x".to_string(),
            stage: PipelineStage::LostLost,
            error: "boom".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"TransitionRolledBack\""));
        assert!(json.contains("\"error\":\"boom\""));
    }

    #[test]
    fn test_broadcast_without_receivers_is_silent() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        broadcast_event(&tx, BoardEvent::BoardReloaded { count: 0 });
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let (tx, mut rx) = broadcast::channel(4);
        broadcast_event(&tx, BoardEvent::BoardReloaded { count: 3 });
        match rx.recv().await.unwrap() {
            BoardEvent::BoardReloaded { count } => assert_eq!(count, 3),
            other => panic!("Expected BoardReloaded, got {:?}", other),
        }
    }
}
