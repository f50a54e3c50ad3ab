//! Scripted wallet provider for tests without a real wallet.
//!
//! Responses are queued ahead of time and every request is recorded so
//! tests can assert exactly what the flow submitted.

use super::{ProviderError, RpcRequest, WalletProvider};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug)]
struct Scripted {
    result: Result<Value, ProviderError>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: Vec<String>,
    connect_error: Option<ProviderError>,
    responses: VecDeque<Scripted>,
    requests: Vec<RpcRequest>,
    connect_calls: usize,
}

/// Mock wallet provider.
///
/// With no scripted response left, `request` fails with an internal error.
#[derive(Debug, Default)]
pub struct MockProvider {
    state: Mutex<MockState>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a mock exposing the given accounts.
    pub fn new<I, S>(accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: Mutex::new(MockState {
                accounts: accounts.into_iter().map(Into::into).collect(),
                ..MockState::default()
            }),
            delay: None,
        }
    }

    /// Make `connect` fail with the given error.
    pub fn with_connect_error(mut self, error: ProviderError) -> Self {
        self.state.get_mut().connect_error = Some(error);
        self
    }

    /// Queue a successful response.
    pub fn with_response(self, value: Value) -> Self {
        self.script(Ok(value), None)
    }

    /// Queue a successful response that is held back for `delay` after it is taken.
    pub fn with_delayed_response(self, value: Value, delay: Duration) -> Self {
        self.script(Ok(value), Some(delay))
    }

    /// Queue a failed response.
    pub fn with_error(self, error: ProviderError) -> Self {
        self.script(Err(error), None)
    }

    fn script(mut self, result: Result<Value, ProviderError>, delay: Option<Duration>) -> Self {
        self.state
            .get_mut()
            .responses
            .push_back(Scripted { result, delay });
        self
    }

    /// Sleep before answering connect and request calls.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<RpcRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Number of `connect` calls received.
    pub async fn connect_calls(&self) -> usize {
        self.state.lock().await.connect_calls
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn connect(&self) -> Result<Vec<String>, ProviderError> {
        self.pause().await;

        let mut state = self.state.lock().await;
        state.connect_calls += 1;
        match &state.connect_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.accounts.clone()),
        }
    }

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        self.pause().await;

        // the response is claimed in arrival order, then released after its own delay
        let scripted = {
            let mut state = self.state.lock().await;
            state.requests.push(request);
            state.responses.pop_front()
        };

        let Some(Scripted { result, delay }) = scripted else {
            return Err(ProviderError::internal("no scripted response"));
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let mock = MockProvider::new(["0xabc"])
            .with_response(json!("first"))
            .with_error(ProviderError::user_rejected("User rejected"));

        let first = mock.request(RpcRequest::new("a", vec![])).await;
        let second = mock.request(RpcRequest::new("b", vec![])).await;
        let third = mock.request(RpcRequest::new("c", vec![])).await;

        assert_eq!(first.unwrap(), json!("first"));
        assert_eq!(second.unwrap_err().message, "User rejected");
        assert_eq!(third.unwrap_err().code, ProviderError::INTERNAL);

        let methods: Vec<String> = mock.requests().await.into_iter().map(|r| r.method).collect();
        assert_eq!(methods, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_connect() {
        let mock = MockProvider::new(["0xabc", "0xdef"]);
        assert_eq!(mock.connect().await.unwrap(), vec!["0xabc", "0xdef"]);

        let failing = MockProvider::new(Vec::<String>::new())
            .with_connect_error(ProviderError::user_rejected("no"));
        assert!(failing.connect().await.is_err());
        assert_eq!(failing.connect_calls().await, 1);
    }
}
