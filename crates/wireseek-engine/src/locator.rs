//! The element locator: precondition checks, atom invocation, and result
//! normalization for the three locate operations.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::error;
use wireseek_atoms::AtomName;
use wireseek_common::session::Session;
use wireseek_common::wire::{
    ElementHandle, LocatorDescriptor, RawLocator, SearchOutcome, SearchValue, WireStatus,
};

use crate::runtime::{BundledAtoms, ScriptAtomProvider, Scheduler, TokioScheduler};

/// Whether a search asks for one element or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindScope {
    Single,
    Multiple,
}

impl FindScope {
    pub fn atom(self) -> AtomName {
        match self {
            FindScope::Single => AtomName::FindElement,
            FindScope::Multiple => AtomName::FindElements,
        }
    }
}

/// Resolves locator descriptors to elements through the session's window.
///
/// The session, atom provider, and scheduler are injected at construction;
/// the locator itself holds no mutable state, so one instance can serve any
/// number of in-flight locate commands.
pub struct ElementLocator {
    pub(crate) session: Arc<dyn Session>,
    pub(crate) atoms: Arc<dyn ScriptAtomProvider>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
}

impl ElementLocator {
    /// Build a locator with the bundled atoms and the tokio scheduler.
    pub fn new(session: Arc<dyn Session>) -> ElementLocator {
        ElementLocator::with_parts(session, Arc::new(BundledAtoms), Arc::new(TokioScheduler))
    }

    pub fn with_parts(
        session: Arc<dyn Session>,
        atoms: Arc<dyn ScriptAtomProvider>,
        scheduler: Arc<dyn Scheduler>,
    ) -> ElementLocator {
        ElementLocator {
            session,
            atoms,
            scheduler,
        }
    }

    pub fn session(&self) -> &dyn Session {
        &*self.session
    }

    /// Locate the first element matching the descriptor.
    ///
    /// Returns NoSuchWindow immediately when the session has no active
    /// window; retry is the caller's responsibility. A success with a null
    /// value is renormalized to NoSuchElement — a bare null is never
    /// propagated as "found".
    pub fn locate_element(&self, locator: &RawLocator, root: Option<&Value>) -> SearchOutcome {
        let outcome = self.find(FindScope::Single, locator, root);
        match locator.validate() {
            Some(descriptor) => normalize_single_result(outcome, &descriptor),
            None => outcome,
        }
    }

    /// Locate every element matching the descriptor. An empty result array
    /// is a valid success; whether it warrants a retry is the caller's call.
    pub fn locate_elements(&self, locator: &RawLocator, root: Option<&Value>) -> SearchOutcome {
        self.find(FindScope::Multiple, locator, root)
    }

    /// Query the currently focused element.
    pub fn locate_active_element(&self) -> SearchOutcome {
        let Some(window) = self.session.current_window() else {
            return SearchOutcome::no_such_window();
        };

        let script = self.atoms.get(AtomName::ActiveElement);
        let raw = match window.evaluate(script, &[]) {
            Ok(raw) => raw,
            Err(err) => {
                error!(error = %err, "active_element atom failed");
                return no_active_element();
            }
        };

        match SearchOutcome::parse(&raw) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "active_element atom returned an unreadable result");
                no_active_element()
            }
        }
    }

    /// The shared search primitive.
    ///
    /// All precondition failures collapse into the NoSuchWindow catch-all:
    /// a missing window, a malformed descriptor, and an unsupported strategy
    /// are indistinguishable to the caller.
    pub(crate) fn find(
        &self,
        scope: FindScope,
        locator: &RawLocator,
        root: Option<&Value>,
    ) -> SearchOutcome {
        let Some(window) = self.session.current_window() else {
            return SearchOutcome::no_such_window();
        };
        let Some(descriptor) = locator.validate() else {
            return SearchOutcome::no_such_window();
        };

        let mut args = vec![
            Value::String(descriptor.using.as_wire().to_string()),
            Value::String(descriptor.value.clone()),
        ];
        if let Some(handle) = root.and_then(ElementHandle::vet) {
            args.push(json!(handle));
        }

        let script = self.atoms.get(scope.atom());
        let raw = match window.evaluate(script, &args) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    error = %err,
                    atom = scope.atom().as_str(),
                    "script atom execution failed"
                );
                return unreadable_result(&descriptor);
            }
        };

        match SearchOutcome::parse(&raw) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    error = %err,
                    atom = scope.atom().as_str(),
                    "script atom returned an unreadable result"
                );
                unreadable_result(&descriptor)
            }
        }
    }
}

/// Rewrite a success-with-null single-element outcome into NoSuchElement.
/// Pure and idempotent: anything already normalized passes through.
pub fn normalize_single_result(
    outcome: SearchOutcome,
    descriptor: &LocatorDescriptor,
) -> SearchOutcome {
    match outcome {
        SearchOutcome::Success(SearchValue::None) => SearchOutcome::failure(
            WireStatus::NoSuchElement,
            format!(
                "Unable to find element with {} '{}'",
                descriptor.using.as_wire(),
                descriptor.value
            ),
        ),
        other => other,
    }
}

/// The silent-diagnostic failure mode for results the core cannot read:
/// status UnknownCommand, carrying the serialized locator.
fn unreadable_result(descriptor: &LocatorDescriptor) -> SearchOutcome {
    let serialized = serde_json::to_string(descriptor)
        .unwrap_or_else(|_| "<unserializable locator>".to_string());
    SearchOutcome::failure(WireStatus::UnknownCommand, serialized)
}

fn no_active_element() -> SearchOutcome {
    SearchOutcome::failure(WireStatus::NoSuchElement, "Unable to locate the active element")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wireseek_common::wire::Strategy;

    fn descriptor() -> LocatorDescriptor {
        LocatorDescriptor {
            using: Strategy::Id,
            value: "missing".to_string(),
        }
    }

    #[test]
    fn test_normalize_rewrites_null_success() {
        let normalized =
            normalize_single_result(SearchOutcome::Success(SearchValue::None), &descriptor());
        assert_eq!(
            normalized,
            SearchOutcome::failure(WireStatus::NoSuchElement, "Unable to find element with id 'missing'")
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once =
            normalize_single_result(SearchOutcome::Success(SearchValue::None), &descriptor());
        let twice = normalize_single_result(once.clone(), &descriptor());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_passes_real_results_through() {
        let found = SearchOutcome::Success(SearchValue::One(ElementHandle::new("3")));
        assert_eq!(
            normalize_single_result(found.clone(), &descriptor()),
            found
        );

        let failed = SearchOutcome::no_such_window();
        assert_eq!(
            normalize_single_result(failed.clone(), &descriptor()),
            failed
        );
    }
}
