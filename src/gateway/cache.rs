//! Request cache in front of a gateway.
//!
//! The opportunity list is served from memory while it is fresh. A successful
//! stage update stores the canonical record as detail data and invalidates
//! the list so the next fetch goes to the backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::StageGateway;
use crate::board::models::{Opportunity, PipelineStage};
use crate::errors::PersistenceError;

#[derive(Debug)]
struct CachedList {
    fetched_at: Instant,
    data: Vec<Opportunity>,
}

#[derive(Debug, Default)]
struct CacheState {
    list: Option<CachedList>,
    details: HashMap<String, Opportunity>,
}

pub struct CachedGateway<G> {
    inner: G,
    stale_time: Duration,
    state: Mutex<CacheState>,
}

impl<G: StageGateway> CachedGateway<G> {
    pub fn new(inner: G, stale_time: Duration) -> Self {
        Self {
            inner,
            stale_time,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last canonical record the backend returned for `id`, if any.
    pub fn detail(&self, id: &str) -> Option<Opportunity> {
        self.state().details.get(id).cloned()
    }

    /// Drop the cached list; the next fetch goes to the backend.
    pub fn invalidate(&self) {
        self.state().list = None;
    }

    fn fresh_list(&self) -> Option<Vec<Opportunity>> {
        let state = self.state();
        state
            .list
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.stale_time)
            .map(|cached| cached.data.clone())
    }
}

#[async_trait]
impl<G: StageGateway> StageGateway for CachedGateway<G> {
    async fn fetch_opportunities(&self) -> Result<Vec<Opportunity>, PersistenceError> {
        if let Some(data) = self.fresh_list() {
            tracing::debug!(count = data.len(), "opportunity list served from cache");
            return Ok(data);
        }
        let data = self.inner.fetch_opportunities().await?;
        self.state().list = Some(CachedList {
            fetched_at: Instant::now(),
            data: data.clone(),
        });
        Ok(data)
    }

    async fn update_stage(
        &self,
        id: &str,
        stage: PipelineStage,
    ) -> Result<Opportunity, PersistenceError> {
        let canonical = self.inner.update_stage(id, stage).await?;
        let mut state = self.state();
        state.details.insert(canonical.id.clone(), canonical.clone());
        state.list = None;
        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;

    fn cached(stale: Duration) -> CachedGateway<InMemoryGateway> {
        CachedGateway::new(
            InMemoryGateway::new(vec![Opportunity::new(
                "a",
                "A",
                PipelineStage::LeadsInterest,
            )]),
            stale,
        )
    }

    #[tokio::test]
    async fn test_fresh_list_is_served_from_cache() {
        let gw = cached(Duration::from_secs(60));
        gw.fetch_opportunities().await.unwrap();
        gw.fetch_opportunities().await.unwrap();
        assert_eq!(gw.inner().fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let gw = cached(Duration::ZERO);
        gw.fetch_opportunities().await.unwrap();
        gw.fetch_opportunities().await.unwrap();
        assert_eq!(gw.inner().fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_update_stores_detail_and_invalidates_list() {
        let gw = cached(Duration::from_secs(60));
        gw.fetch_opportunities().await.unwrap();
        let canonical = gw.update_stage("a", PipelineStage::LostLost).await.unwrap();
        assert_eq!(gw.detail("a"), Some(canonical));

        let list = gw.fetch_opportunities().await.unwrap();
        assert_eq!(gw.inner().fetch_calls(), 2);
        assert_eq!(list[0].pipeline_stage, PipelineStage::LostLost);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_cache() {
        let gw = cached(Duration::from_secs(60));
        gw.fetch_opportunities().await.unwrap();
        gw.inner().fail_updates_for("a");
        assert!(gw.update_stage("a", PipelineStage::LostLost).await.is_err());
        assert!(gw.detail("a").is_none());
        gw.fetch_opportunities().await.unwrap();
        assert_eq!(gw.inner().fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_explicit_invalidate() {
        let gw = cached(Duration::from_secs(60));
        gw.fetch_opportunities().await.unwrap();
        gw.invalidate();
        gw.fetch_opportunities().await.unwrap();
        assert_eq!(gw.inner().fetch_calls(), 2);
    }
}
