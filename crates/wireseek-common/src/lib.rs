pub mod session;
pub mod taxonomy;
pub mod wire;

pub use session::{Capabilities, ResponseSink, ScriptError, Session, Window};
pub use taxonomy::{
    ErrorTaxonomy, FailedCommandError, InvalidRequestError, InvalidRequestKind,
    write_failed_command, write_invalid_request,
};
pub use wire::{
    CommandRequest, ElementHandle, LocatorDescriptor, OutcomeParseError, RawLocator, SearchOutcome,
    SearchValue, Strategy, WireStatus,
};
