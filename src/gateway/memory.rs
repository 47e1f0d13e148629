use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::StageGateway;
use crate::board::models::{Opportunity, PipelineStage};
use crate::errors::PersistenceError;

/// Map-backed gateway. Serves the local backend and tests.
///
/// Failures can be injected per id or globally; every `update_stage` call is
/// counted, including the ones that fail.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    records: Mutex<Vec<Opportunity>>,
    failing_ids: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new(records: Vec<Opportunity>) -> Self {
        Self {
            records: Mutex::new(
                records
                    .into_iter()
                    .map(|mut opp| {
                        opp.persisted = true;
                        opp
                    })
                    .collect(),
            ),
            ..Self::default()
        }
    }

    fn records(&self) -> MutexGuard<'_, Vec<Opportunity>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Vec<Opportunity> {
        self.records().clone()
    }

    pub fn get(&self, id: &str) -> Option<Opportunity> {
        self.records().iter().find(|opp| opp.id == id).cloned()
    }

    pub fn fail_updates_for(&self, id: impl Into<String>) {
        self.failing_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into());
    }

    pub fn fail_all_updates(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn should_fail(&self, id: &str) -> bool {
        self.fail_all.load(Ordering::SeqCst)
            || self
                .failing_ids
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(id)
    }
}

#[async_trait]
impl StageGateway for InMemoryGateway {
    async fn fetch_opportunities(&self) -> Result<Vec<Opportunity>, PersistenceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot())
    }

    async fn update_stage(
        &self,
        id: &str,
        stage: PipelineStage,
    ) -> Result<Opportunity, PersistenceError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(id) {
            return Err(PersistenceError::Injected {
                id: id.to_string(),
                stage,
            });
        }
        let mut records = self.records();
        let record = records
            .iter_mut()
            .find(|opp| opp.id == id)
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })?;
        record.pipeline_stage = stage;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> InMemoryGateway {
        InMemoryGateway::new(vec![
            Opportunity::new("a", "A", PipelineStage::LeadsInterest),
            Opportunity::new("b", "B", PipelineStage::ProspectQuote).unpersisted(),
        ])
    }

    #[tokio::test]
    async fn test_update_stage_returns_canonical_record() {
        let gw = gateway();
        let updated = gw
            .update_stage("a", PipelineStage::LostLost)
            .await
            .unwrap();
        assert_eq!(updated.pipeline_stage, PipelineStage::LostLost);
        assert_eq!(gw.get("a").unwrap().pipeline_stage, PipelineStage::LostLost);
        assert_eq!(gw.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails() {
        let gw = gateway();
        let err = gw
            .update_stage("nope", PipelineStage::LostLost)
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_record_untouched() {
        let gw = gateway();
        gw.fail_updates_for("a");
        let err = gw
            .update_stage("a", PipelineStage::ProspectQuote)
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Injected { .. }));
        assert_eq!(gw.get("a").unwrap().pipeline_stage, PipelineStage::LeadsInterest);
        assert_eq!(gw.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_stored_records_are_marked_persisted() {
        let gw = gateway();
        let all = gw.fetch_opportunities().await.unwrap();
        assert!(all.iter().all(|o| o.persisted));
        assert_eq!(gw.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_fail_all_toggle() {
        let gw = gateway();
        gw.fail_all_updates(true);
        assert!(gw.update_stage("b", PipelineStage::LostLost).await.is_err());
        gw.fail_all_updates(false);
        assert!(gw.update_stage("b", PipelineStage::LostLost).await.is_ok());
    }
}
