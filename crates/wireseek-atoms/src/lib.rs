//! Bundled script atoms executed in page context by the locator engine.
//!
//! Each atom is a standalone function expression that performs one DOM query
//! and returns a JSON-encoded `{status, value}` envelope.

/// Locates the first element matching a strategy/value pair.
pub const FIND_ELEMENT_JS: &str = include_str!("js/find_element.js");

/// Locates every element matching a strategy/value pair.
pub const FIND_ELEMENTS_JS: &str = include_str!("js/find_elements.js");

/// Reports the currently focused element.
pub const ACTIVE_ELEMENT_JS: &str = include_str!("js/active_element.js");

/// Canonical atom names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomName {
    FindElement,
    FindElements,
    ActiveElement,
}

impl AtomName {
    pub fn as_str(self) -> &'static str {
        match self {
            AtomName::FindElement => "find_element",
            AtomName::FindElements => "find_elements",
            AtomName::ActiveElement => "active_element",
        }
    }
}

/// Resolve an atom name to its bundled source.
pub fn source(atom: AtomName) -> &'static str {
    match atom {
        AtomName::FindElement => FIND_ELEMENT_JS,
        AtomName::FindElements => FIND_ELEMENTS_JS,
        AtomName::ActiveElement => ACTIVE_ELEMENT_JS,
    }
}
