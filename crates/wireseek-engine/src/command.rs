//! The locate-command retry state machine.
//!
//! `handle_locate_command` drives the pipeline:
//! parse body → invoke locator → evaluate verdict → respond or re-poll.
//!
//! The transition logic lives in the pure [`evaluate_poll`] function; the
//! async driver only supplies fresh outcomes and sleeps between attempts.
//! Polls for one request are strictly sequential — a new attempt starts only
//! after the previous verdict came back as Retry and the fixed delay
//! elapsed.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;
use wireseek_common::session::ResponseSink;
use wireseek_common::taxonomy::{
    ErrorTaxonomy, InvalidRequestError, InvalidRequestKind, write_failed_command,
};
use wireseek_common::wire::{CommandRequest, RawLocator, SearchOutcome, WireStatus};

use crate::locator::ElementLocator;

/// Delay between poll attempts. Fixed: no backoff, not configurable.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A dispatcher-supplied search routine. May legitimately produce no outcome
/// at all, which the state machine treats as a malformed request.
pub type LocatorFn<'a> =
    &'a (dyn Fn(&RawLocator, Option<&Value>) -> Option<SearchOutcome> + Send + Sync);

/// Which search routine a locate command runs on each poll.
pub enum LocatorMethod<'a> {
    Element,
    Elements,
    ActiveElement,
    Custom(LocatorFn<'a>),
}

/// The verdict of one poll attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PollVerdict {
    /// Write the value through the sink's success path and stop.
    Succeed(Value),
    /// Sleep [`POLL_INTERVAL`] and poll again.
    Retry,
    /// Deadline passed with a real outcome in hand: write the single
    /// failed-command response shape and stop.
    GiveUp { status: WireStatus, message: String },
    /// Deadline passed with no outcome at all: raise an invalid-request
    /// error to the dispatcher.
    Reject,
}

/// Decide what one poll attempt means.
///
/// The deadline is recomputed from `search_start + implicit_timeout` on
/// every call — never cached — so a zero timeout is already expired by the
/// first evaluation. A present, non-empty value succeeds outright; a
/// present-but-empty value (an empty handle array) succeeds only once the
/// deadline has passed.
pub fn evaluate_poll(
    outcome: Option<&SearchOutcome>,
    search_start: Instant,
    implicit_timeout: Duration,
    now: Instant,
) -> PollVerdict {
    let deadline = search_start + implicit_timeout;

    if let Some(SearchOutcome::Success(value)) = outcome {
        if value.is_present() && (value.count() != 0 || now > deadline) {
            return PollVerdict::Succeed(value.to_wire());
        }
    }

    if now < deadline {
        return PollVerdict::Retry;
    }

    match outcome {
        Some(SearchOutcome::Failure { status, message }) => PollVerdict::GiveUp {
            status: *status,
            message: message.clone(),
        },
        // A success that never produced a usable value gives up under its
        // own (success) status; the error layer maps it to the generic
        // "unknown" class.
        Some(SearchOutcome::Success(_)) => PollVerdict::GiveUp {
            status: WireStatus::Success,
            message: String::new(),
        },
        None => PollVerdict::Reject,
    }
}

impl ElementLocator {
    /// Drive a locate command to completion.
    ///
    /// Polls the chosen locator method (defaulting to the single-element
    /// search) every 50 ms until it yields a usable value or the session's
    /// implicit-wait deadline passes. Terminal failures are written directly
    /// as the HTTP 500 failed-command shape; only a locator that produced no
    /// outcome at all makes this return an error, which the dispatcher is
    /// expected to catch and write.
    ///
    /// `start_time` anchors the deadline and is normally left `None`; a
    /// caller re-entering an interrupted search may carry the original
    /// anchor over.
    pub async fn handle_locate_command(
        &self,
        request: &CommandRequest,
        sink: &mut dyn ResponseSink,
        method: Option<LocatorMethod<'_>>,
        root: Option<&Value>,
        start_time: Option<Instant>,
    ) -> Result<(), InvalidRequestError> {
        let search_start = start_time.unwrap_or_else(Instant::now);
        let method = method.unwrap_or(LocatorMethod::Element);
        let locator = RawLocator::from_body(request.body.as_deref());

        loop {
            let outcome = self.invoke(&method, &locator, root);
            let verdict = evaluate_poll(
                outcome.as_ref(),
                search_start,
                self.session.implicit_timeout(),
                Instant::now(),
            );

            match verdict {
                PollVerdict::Succeed(value) => {
                    let session_id = self.session.id();
                    sink.success(session_id.as_deref(), &value);
                    return Ok(());
                }
                PollVerdict::Retry => {
                    debug!(
                        elapsed_ms = search_start.elapsed().as_millis() as u64,
                        "element not located yet, polling again"
                    );
                    self.scheduler.sleep(POLL_INTERVAL).await;
                }
                PollVerdict::GiveUp { status, message } => {
                    let error = ErrorTaxonomy::failed_command(
                        Some(status.code()),
                        message,
                        request,
                        self.session(),
                    );
                    write_failed_command(&error, sink);
                    return Ok(());
                }
                PollVerdict::Reject => {
                    return Err(ErrorTaxonomy::invalid_request(
                        InvalidRequestKind::VariableResourceNotFound,
                        request,
                    ));
                }
            }
        }
    }

    fn invoke(
        &self,
        method: &LocatorMethod<'_>,
        locator: &RawLocator,
        root: Option<&Value>,
    ) -> Option<SearchOutcome> {
        match method {
            LocatorMethod::Element => Some(self.locate_element(locator, root)),
            LocatorMethod::Elements => Some(self.locate_elements(locator, root)),
            LocatorMethod::ActiveElement => Some(self.locate_active_element()),
            LocatorMethod::Custom(locate) => locate(locator, root),
        }
    }
}
