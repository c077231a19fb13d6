use log::info;

use super::session::{SessionStore, Storage};
use super::transport::HttpTransport;
use super::types::{GenerateRequest, GenerationResult, HealthStatus};
use crate::error::Result;

/// Backend client: the HTTP transport plus the session it speaks for.
///
/// Constructed explicitly with a transport (base URL, timeout) and a session
/// store, then handed to the controller.
#[derive(Debug)]
pub struct BackendClient<S: Storage> {
    transport: HttpTransport,
    session: SessionStore<S>,
}

impl<S: Storage> BackendClient<S> {
    pub fn new(transport: HttpTransport, session: SessionStore<S>) -> Self {
        Self { transport, session }
    }

    /// Shared transport, for issuing requests off the UI thread.
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Request body for `prompt` in the current session.
    pub fn build_request(&self, prompt: &str, is_refinement: bool) -> GenerateRequest {
        GenerateRequest {
            prompt: prompt.to_string(),
            session_id: self.session.current().to_string(),
            is_refinement,
        }
    }

    /// Generates a new model, or refines the session's previous one.
    pub async fn generate(&self, prompt: &str, is_refinement: bool) -> Result<GenerationResult> {
        let request = self.build_request(prompt, is_refinement);
        self.transport.generate(&request).await
    }

    pub async fn refine(&self, prompt: &str) -> Result<GenerationResult> {
        self.generate(prompt, true).await
    }

    pub async fn check_health(&self) -> Result<HealthStatus> {
        let status = self.transport.health().await?;
        info!("Backend connected successfully");
        Ok(status)
    }

    pub fn current_session_id(&self) -> &str {
        self.session.current()
    }

    /// Starts a new session; the previous id is never sent again.
    pub fn reset_session(&mut self) -> String {
        self.session.reset().to_string()
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }
}
