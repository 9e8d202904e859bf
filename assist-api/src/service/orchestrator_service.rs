use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::orchestrator::{ChatRequest, StreamEvent};
use crate::error::CoreError;
use crate::service::model_provider_service::CancellationContext;

/// Orchestrator: drives classification → resolution → prompt assembly
/// → streaming generation → post-processing → persistence for one turn.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn handle_turn(
        &self,
        request: ChatRequest,
        cancel: CancellationContext,
    ) -> BoxStream<'static, Result<StreamEvent, CoreError>>;
}
