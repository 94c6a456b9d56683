use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use tiny_agent_model::{
    ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};
use tracing::Instrument;

type SendRequestResult = Result<ModelResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// How the agent retries provider requests that failed transiently
/// (rate limiting). Other failures are never retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    initial_interval: Duration,
    max_elapsed_time: Option<Duration>,
}

impl RetryPolicy {
    /// Retries with an exponential backoff starting at `initial_interval`,
    /// and gives up once `max_elapsed_time` has passed.
    #[inline]
    pub fn exponential(
        initial_interval: Duration,
        max_elapsed_time: Duration,
    ) -> Self {
        Self {
            initial_interval,
            max_elapsed_time: Some(max_elapsed_time),
        }
    }

    /// Never retries.
    #[inline]
    pub fn none() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_elapsed_time: None,
        }
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        self.max_elapsed_time.is_some()
    }
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self::exponential(Duration::from_millis(500), Duration::from_secs(30))
    }
}

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
    retry_policy: RetryPolicy,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(async move {
                trace!("sending a request: {req:?}");
                fut.await.map_err(|err| {
                    debug!("got an error: {err:?}");
                    Box::new(err) as Box<dyn ModelProviderError>
                })
            })
        });
        Self {
            handler_fn,
            retry_policy: RetryPolicy::default(),
        }
    }

    #[inline]
    pub fn set_retry_policy(&mut self, retry_policy: RetryPolicy) {
        self.retry_policy = retry_policy;
    }

    /// Sends a request and waits for the complete response.
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        let span = trace_span!("model client req");
        if !self.retry_policy.is_enabled() {
            return (self.handler_fn)(req).instrument(span).await;
        }

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.retry_policy.initial_interval)
            .with_max_elapsed_time(self.retry_policy.max_elapsed_time)
            .build();
        let result = backoff::future::retry(backoff, || {
            let fut = (self.handler_fn)(req.clone());
            async move {
                fut.await.map_err(|err| {
                    if err.kind().is_transient() {
                        warn!("provider is busy, will retry: {err}");
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        })
        .instrument(span)
        .await;
        if let Err(err) = &result {
            error!("request failed: {err}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use tiny_agent_model::{ErrorKind, ModelMessage};
    use tiny_agent_test_model::{PresetResponse, TestModelProvider};

    use super::*;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::exponential(
            Duration::from_millis(1),
            Duration::from_secs(5),
        )
    }

    fn hi_request() -> ModelRequest {
        ModelRequest {
            messages: vec![ModelMessage::User("Hi".to_owned())],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_message("How are you?"),
        );
        let model_client = ModelClient::new(model_provider);

        for _ in 0..3 {
            let resp = model_client.send_request(hi_request()).await.unwrap();
            assert_eq!(resp.choices[0].content.as_deref(), Some("How are you?"));
            assert!(resp.choices[0].opaque.is_some());
        }
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_message("Finally").with_failures(2),
        );
        let mut model_client = ModelClient::new(model_provider.clone());
        model_client.set_retry_policy(fast_retry());

        let resp = model_client.send_request(hi_request()).await.unwrap();
        assert_eq!(resp.choices[0].content.as_deref(), Some("Finally"));
        assert_eq!(model_provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_error_handling() {
        // Permanent errors are not retried. An empty script runs out of
        // steps right away.
        let model_provider = TestModelProvider::default();
        let mut model_client = ModelClient::new(model_provider.clone());
        model_client.set_retry_policy(fast_retry());
        let err = model_client.send_request(hi_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(model_provider.requests().len(), 1);

        // Without a retry policy, transient errors surface immediately.
        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_message("Never").with_failures(0),
        );
        let mut model_client = ModelClient::new(model_provider.clone());
        model_client.set_retry_policy(RetryPolicy::none());
        let err = model_client.send_request(hi_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
        assert_eq!(model_provider.requests().len(), 1);
    }
}
