//! The collaborator surface this core consumes.
//!
//! Sessions, windows, and response sinks are owned by the surrounding
//! driver; the locator only sees them through these traits, which are
//! injected at construction so tests can substitute fakes.

use std::time::Duration;

use serde_json::Value;

/// Capability flags advertised by a session.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Capabilities {
    #[serde(rename = "takesScreenshot", default)]
    pub takes_screenshot: bool,
}

/// Failure to run a script inside the page.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScriptError {
    #[error("script evaluation failed: {0}")]
    Evaluation(String),
    #[error("execution context lost")]
    ContextLost,
}

/// A browser window capable of executing script atoms in page context.
pub trait Window {
    /// Execute a script atom with the given arguments and return the
    /// JSON-encoded result string.
    fn evaluate(&self, script: &str, args: &[Value]) -> Result<String, ScriptError>;

    /// Best-effort capture of the window contents as a base64-encoded image.
    fn render_base64(&self, format: &str) -> Option<String>;
}

/// A long-lived browser session, shared read-only by every in-flight
/// locate command.
pub trait Session: Send + Sync {
    fn id(&self) -> Option<String>;

    /// How long element lookups keep retrying before giving up.
    fn implicit_timeout(&self) -> Duration;

    fn current_window(&self) -> Option<&dyn Window>;

    fn capabilities(&self) -> &Capabilities;
}

/// Where command results are written.
///
/// `success` is the high-level path for located elements; the remaining
/// methods are the lower-level response surface the error writers use.
pub trait ResponseSink {
    fn success(&mut self, session_id: Option<&str>, value: &Value);

    fn set_status(&mut self, status: u16);

    fn set_header(&mut self, name: &str, value: &str);

    fn write_and_close(&mut self, body: &str);

    fn write_json_and_close(&mut self, body: &Value);
}
