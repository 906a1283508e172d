//! wireseek-engine: the element-locating core.
//!
//! Resolves locator descriptors to elements via script atoms executed in a
//! session's window, polling on a fixed cadence until the session's
//! implicit-wait deadline, and mapping terminal failures through the wire
//! protocol's error taxonomy.

pub mod command;
pub mod locator;
pub mod runtime;

pub use wireseek_common::session;
pub use wireseek_common::taxonomy;
pub use wireseek_common::wire;

pub use command::{LocatorFn, LocatorMethod, POLL_INTERVAL, PollVerdict, evaluate_poll};
pub use locator::{ElementLocator, FindScope, normalize_single_result};
pub use runtime::{BundledAtoms, ScriptAtomProvider, Scheduler, TokioScheduler};
