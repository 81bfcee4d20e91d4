//! Where scoring happens: in-process or behind a transport.

use reba_score::{RebaEngine, RebaParams, RebaRequest, RebaResponse, RequestError};

/// Errors from a [`ScoringBackend`].
///
/// `Unavailable` and `Timeout` are transient; the next tick simply tries again.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("scoring backend unavailable: {0}")]
    Unavailable(String),
    #[error("scoring backend timed out")]
    Timeout,
    #[error("request rejected: {0}")]
    Rejected(#[from] RequestError),
}

impl BackendError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, BackendError::Rejected(_))
    }
}

/// Scores one request.
///
/// Implement this for an out-of-process scorer (HTTP, IPC, ...); the session
/// only ever sees the wire contract.
pub trait ScoringBackend {
    fn score(&self, request: &RebaRequest) -> Result<RebaResponse, BackendError>;
}

impl<B: ScoringBackend + ?Sized> ScoringBackend for &B {
    fn score(&self, request: &RebaRequest) -> Result<RebaResponse, BackendError> {
        (**self).score(request)
    }
}

impl<B: ScoringBackend + ?Sized> ScoringBackend for Box<B> {
    fn score(&self, request: &RebaRequest) -> Result<RebaResponse, BackendError> {
        (**self).score(request)
    }
}

/// Runs [`RebaEngine`] on the calling thread.
#[derive(Clone, Debug, Default)]
pub struct InProcessBackend {
    engine: RebaEngine,
}

impl InProcessBackend {
    pub fn new(params: RebaParams) -> Self {
        Self {
            engine: RebaEngine::new(params),
        }
    }

    pub fn engine(&self) -> &RebaEngine {
        &self.engine
    }
}

impl ScoringBackend for InProcessBackend {
    fn score(&self, request: &RebaRequest) -> Result<RebaResponse, BackendError> {
        Ok(self.engine.score_request(request)?)
    }
}
