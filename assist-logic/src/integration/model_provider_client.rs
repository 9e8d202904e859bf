use std::time::Duration;

use assist_api::error::CoreError;
use assist_api::service::model_provider_service::{CancellationContext, ModelProviderService};
use async_stream::stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;

/// HTTP-backed language model provider, the external collaborator behind
/// text generation. The upstream is expected to respond with a
/// newline-delimited stream of UTF-8 text chunks.
#[derive(Debug, Clone)]
pub struct ModelProviderHttpClient {
    http_client: Client,
    base_url: String,
    model_name: String,
    first_token_timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

impl ModelProviderHttpClient {
    /// `timeout` bounds the whole request (including however long the
    /// upstream takes to finish streaming); `first_token_timeout` bounds
    /// only the wait for the first chunk, so a model that accepted the
    /// request but never starts answering doesn't tie up a turn for the
    /// full request timeout.
    pub fn new(
        base_url: String,
        model_name: String,
        timeout: Duration,
        first_token_timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        Ok(Self { http_client, base_url, model_name, first_token_timeout })
    }
}

#[async_trait]
impl ModelProviderService for ModelProviderHttpClient {
    async fn stream_generate(
        &self,
        prompt: String,
        cancel: CancellationContext,
    ) -> BoxStream<'static, Result<String, CoreError>> {
        let http_client = self.http_client.clone();
        let url = format!("{}/generate", self.base_url);
        let model_name = self.model_name.clone();
        let first_token_timeout = self.first_token_timeout;

        let stream = stream! {
            let request = GenerateRequest { model: &model_name, prompt: &prompt, stream: true };

            let response = match http_client.post(&url).json(&request).send().await {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    yield Err(CoreError::Upstream(format!("model provider timed out: {e}")));
                    return;
                }
                Err(e) => {
                    yield Err(CoreError::Upstream(e.to_string()));
                    return;
                }
            };

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                yield Err(CoreError::RateLimited);
                return;
            }
            // The upstream reports a prompt that overruns its context window
            // with 413 Payload Too Large; the orchestrator trims history and
            // retries once rather than treating this as a generic failure.
            if response.status() == reqwest::StatusCode::PAYLOAD_TOO_LARGE {
                yield Err(CoreError::ContextTooLong(format!("model provider returned {}", response.status())));
                return;
            }
            if !response.status().is_success() {
                yield Err(CoreError::Upstream(format!("model provider returned {}", response.status())));
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut pending = String::new();
            let mut first_chunk = true;

            loop {
                let next = if first_chunk {
                    match tokio::time::timeout(first_token_timeout, bytes.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            yield Err(CoreError::Upstream("model provider timed out waiting for the first token".to_string()));
                            return;
                        }
                    }
                } else {
                    bytes.next().await
                };
                let Some(chunk) = next else { break };
                first_chunk = false;

                if cancel.is_cancelled() {
                    yield Err(CoreError::Cancelled);
                    return;
                }

                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(CoreError::Upstream(e.to_string()));
                        return;
                    }
                };

                pending.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = pending.find('\n') {
                    let line: String = pending.drain(..=pos).collect();
                    let token = line.trim_end_matches('\n');
                    if !token.is_empty() {
                        yield Ok(token.to_string());
                    }
                }
            }

            if !pending.is_empty() {
                yield Ok(pending);
            }
        };

        Box::pin(stream)
    }
}
