//! The protocol failure taxonomy.
//!
//! Two disjoint families, never conflated:
//!
//! - *invalid-request* errors: the client sent a structurally bad command.
//!   These are plain records raised to the dispatcher (the only thrown path
//!   in the core) and written as plain-text responses with a per-kind HTTP
//!   status.
//! - *failed-command* errors: a well-formed command executed but the
//!   browser-level operation failed. These are always written directly as an
//!   HTTP 500 JSON body in a single shape shared by every kind.
//!
//! Building a record and writing it to a response are separate steps so the
//! records stay data-only.

use serde_json::json;
use tracing::debug;

use crate::session::{ResponseSink, Session};
use crate::wire::{CommandRequest, WireStatus};

// ============================================================
// Invalid-request errors
// ============================================================

/// Client/protocol-shape failure kinds. Never tied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidRequestKind {
    UnknownCommand,
    UnimplementedCommand,
    VariableResourceNotFound,
    InvalidCommandMethod,
    MissingCommandParameter,
}

impl InvalidRequestKind {
    pub const ALL: [InvalidRequestKind; 5] = [
        InvalidRequestKind::UnknownCommand,
        InvalidRequestKind::UnimplementedCommand,
        InvalidRequestKind::VariableResourceNotFound,
        InvalidRequestKind::InvalidCommandMethod,
        InvalidRequestKind::MissingCommandParameter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InvalidRequestKind::UnknownCommand => "UnknownCommand",
            InvalidRequestKind::UnimplementedCommand => "UnimplementedCommand",
            InvalidRequestKind::VariableResourceNotFound => "VariableResourceNotFound",
            InvalidRequestKind::InvalidCommandMethod => "InvalidCommandMethod",
            InvalidRequestKind::MissingCommandParameter => "MissingCommandParameter",
        }
    }

    /// The HTTP status line written for this kind. Anything not given a
    /// specific status responds 404.
    pub fn http_status(self) -> u16 {
        match self {
            InvalidRequestKind::UnimplementedCommand => 501,
            InvalidRequestKind::InvalidCommandMethod => 405,
            InvalidRequestKind::MissingCommandParameter => 400,
            _ => 404,
        }
    }
}

impl std::fmt::Display for InvalidRequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A structurally bad command. Raised to the dispatcher, which writes it via
/// [`write_invalid_request`]. Carries no session id and no screenshot, ever.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct InvalidRequestError {
    pub kind: InvalidRequestKind,
    pub message: String,
}

// ============================================================
// Failed-command errors
// ============================================================

/// A well-formed command whose browser-level operation failed.
#[derive(Debug, Clone)]
pub struct FailedCommandError {
    pub status: WireStatus,
    pub message: String,
    pub session_id: Option<String>,
    /// Base64-encoded PNG, captured only when the session advertises the
    /// capability and has an active window.
    pub screenshot: Option<String>,
}

/// Constructors for both error families.
pub struct ErrorTaxonomy;

impl ErrorTaxonomy {
    /// Build an invalid-request record, embedding the serialized original
    /// request in the message.
    pub fn invalid_request(
        kind: InvalidRequestKind,
        request: &CommandRequest,
    ) -> InvalidRequestError {
        InvalidRequestError {
            kind,
            message: format!("{} - {}", kind, request.serialized()),
        }
    }

    /// Build a failed-command record from a raw status code (non-numeric and
    /// unrecognized codes normalize to `UnknownError`), attaching the session
    /// id and, when permitted, a screenshot.
    pub fn failed_command(
        code: Option<i64>,
        message: impl Into<String>,
        request: &CommandRequest,
        session: &dyn Session,
    ) -> FailedCommandError {
        let status = WireStatus::normalize(code);
        debug!(
            status = status.code(),
            request = %request.serialized(),
            "command failed"
        );
        let screenshot = if session.capabilities().takes_screenshot {
            session
                .current_window()
                .and_then(|window| window.render_base64("png"))
        } else {
            None
        };
        FailedCommandError {
            status,
            message: message.into(),
            session_id: session.id(),
            screenshot,
        }
    }
}

// ============================================================
// Response writers
// ============================================================

/// Write an invalid-request error: status per kind, plain text body
/// `"<kind> - <serialized request>"`, then close. Terminates the request.
pub fn write_invalid_request(error: &InvalidRequestError, sink: &mut dyn ResponseSink) {
    sink.set_status(error.kind.http_status());
    sink.set_header("Content-Type", "text/plain");
    sink.write_and_close(&error.message);
}

/// Write a failed-command error. Always HTTP 500 with the single JSON shape
/// used for every non-invalid-request failure; callers must not special-case
/// individual kinds.
pub fn write_failed_command(error: &FailedCommandError, sink: &mut dyn ResponseSink) {
    sink.set_status(500);
    sink.write_json_and_close(&json!({
        "sessionId": error.session_id,
        "status": error.status.code(),
        "value": {
            "message": error.message,
            "screen": error.screenshot.as_deref().unwrap_or(""),
            "class": error.status.class_name().unwrap_or("unknown"),
        }
    }));
}
