//! Remote sync gateway: where opportunity stages are persisted.
//!
//! | Module   | Responsibility                                             |
//! |----------|------------------------------------------------------------|
//! | `http`   | `HttpGateway`: REST client with bearer auth and refresh    |
//! | `memory` | `InMemoryGateway`: map-backed store with failure injection|
//! | `cache`  | `CachedGateway`: list cache with stale time + invalidation|

pub mod cache;
pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::board::models::{Opportunity, PipelineStage};
use crate::errors::PersistenceError;

pub use cache::CachedGateway;
pub use http::HttpGateway;
pub use memory::InMemoryGateway;

#[async_trait]
pub trait StageGateway: Send + Sync {
    /// Initial load and refresh of the opportunity list.
    async fn fetch_opportunities(&self) -> Result<Vec<Opportunity>, PersistenceError>;

    /// Persist a stage change and return the backend's canonical record.
    /// Must fail for unknown ids.
    async fn update_stage(
        &self,
        id: &str,
        stage: PipelineStage,
    ) -> Result<Opportunity, PersistenceError>;
}

#[async_trait]
impl<G: StageGateway + ?Sized> StageGateway for Arc<G> {
    async fn fetch_opportunities(&self) -> Result<Vec<Opportunity>, PersistenceError> {
        (**self).fetch_opportunities().await
    }

    async fn update_stage(
        &self,
        id: &str,
        stage: PipelineStage,
    ) -> Result<Opportunity, PersistenceError> {
        (**self).update_stage(id, stage).await
    }
}
