//! Wire-level vocabulary of the element-locating protocol.
//!
//! Everything a locate command exchanges with the outside world lives here:
//! locator strategies and descriptors, opaque element handles, the legacy
//! numeric status table, and the `SearchOutcome` envelope that script atoms
//! return. Raw JSON from the page is parsed into these types exactly once,
//! at the script-execution boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recognized element search strategy.
///
/// Each strategy has one canonical wire form plus zero or more accepted
/// aliases. The canonical form is what gets serialized back out and what is
/// handed to the script atoms, so `className` and `"class name"` end up in
/// the identical atom invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "class name", alias = "className")]
    ClassName,
    #[serde(rename = "css selector", alias = "css")]
    CssSelector,
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "link text", alias = "linkText")]
    LinkText,
    #[serde(rename = "partial link text", alias = "partialLinkText")]
    PartialLinkText,
    #[serde(rename = "tag name", alias = "tagName")]
    TagName,
    #[serde(rename = "xpath")]
    Xpath,
}

impl Strategy {
    /// The canonical wire form of this strategy.
    pub fn as_wire(self) -> &'static str {
        match self {
            Strategy::ClassName => "class name",
            Strategy::CssSelector => "css selector",
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::LinkText => "link text",
            Strategy::PartialLinkText => "partial link text",
            Strategy::TagName => "tag name",
            Strategy::Xpath => "xpath",
        }
    }

    /// Parse a wire string, accepting both canonical forms and aliases.
    pub fn from_wire(s: &str) -> Option<Strategy> {
        match s {
            "class name" | "className" => Some(Strategy::ClassName),
            "css selector" | "css" => Some(Strategy::CssSelector),
            "id" => Some(Strategy::Id),
            "name" => Some(Strategy::Name),
            "link text" | "linkText" => Some(Strategy::LinkText),
            "partial link text" | "partialLinkText" => Some(Strategy::PartialLinkText),
            "tag name" | "tagName" => Some(Strategy::TagName),
            "xpath" => Some(Strategy::Xpath),
            _ => None,
        }
    }
}

/// A locator descriptor as it arrives off the wire, before validation.
///
/// Both fields are optional so a structurally bad request body can still be
/// carried to the precondition check instead of failing mid-parse. A missing
/// or unparsable body is represented by `RawLocator::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RawLocator {
    /// Build a locator from a request body. Missing, non-JSON, or non-object
    /// bodies all yield the implicit empty locator.
    pub fn from_body(body: Option<&str>) -> RawLocator {
        body.and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Validate into a well-formed descriptor: both fields present and the
    /// strategy a member of the supported set.
    pub fn validate(&self) -> Option<LocatorDescriptor> {
        let using = Strategy::from_wire(self.using.as_deref()?)?;
        let value = self.value.clone()?;
        Some(LocatorDescriptor { using, value })
    }
}

/// A validated search descriptor: strategy plus search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorDescriptor {
    pub using: Strategy,
    pub value: String,
}

/// Opaque reference to a DOM node, scoped to one session.
///
/// The core never looks inside beyond the presence of a non-empty `ELEMENT`
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    #[serde(rename = "ELEMENT")]
    pub reference: String,
}

impl ElementHandle {
    pub fn new(reference: impl Into<String>) -> ElementHandle {
        ElementHandle {
            reference: reference.into(),
        }
    }

    /// Vet an untyped wire value as a root-element argument. Anything that is
    /// not an object carrying a non-empty `ELEMENT` key is discarded.
    pub fn vet(value: &Value) -> Option<ElementHandle> {
        let reference = value.as_object()?.get("ELEMENT")?.as_str()?;
        if reference.is_empty() {
            return None;
        }
        Some(ElementHandle::new(reference))
    }
}

// ============================================================
// Status codes
// ============================================================

/// The legacy wire protocol's numeric status table.
///
/// Any code outside this table (or a missing/non-numeric one) normalizes to
/// `UnknownError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireStatus {
    Success,
    NoSuchDriver,
    NoSuchElement,
    NoSuchFrame,
    UnknownCommand,
    StaleElementReference,
    ElementNotVisible,
    InvalidElementState,
    UnknownError,
    ElementIsNotSelectable,
    JavaScriptError,
    XPathLookupError,
    Timeout,
    NoSuchWindow,
    InvalidCookieDomain,
    UnableToSetCookie,
    UnexpectedAlertOpen,
    NoAlertOpenError,
    ScriptTimeout,
    InvalidElementCoordinates,
    InvalidSelector,
}

impl WireStatus {
    /// Every status in the table, in code order.
    pub const ALL: [WireStatus; 21] = [
        WireStatus::Success,
        WireStatus::NoSuchDriver,
        WireStatus::NoSuchElement,
        WireStatus::NoSuchFrame,
        WireStatus::UnknownCommand,
        WireStatus::StaleElementReference,
        WireStatus::ElementNotVisible,
        WireStatus::InvalidElementState,
        WireStatus::UnknownError,
        WireStatus::ElementIsNotSelectable,
        WireStatus::JavaScriptError,
        WireStatus::XPathLookupError,
        WireStatus::Timeout,
        WireStatus::NoSuchWindow,
        WireStatus::InvalidCookieDomain,
        WireStatus::UnableToSetCookie,
        WireStatus::UnexpectedAlertOpen,
        WireStatus::NoAlertOpenError,
        WireStatus::ScriptTimeout,
        WireStatus::InvalidElementCoordinates,
        WireStatus::InvalidSelector,
    ];

    pub fn code(self) -> i64 {
        match self {
            WireStatus::Success => 0,
            WireStatus::NoSuchDriver => 6,
            WireStatus::NoSuchElement => 7,
            WireStatus::NoSuchFrame => 8,
            WireStatus::UnknownCommand => 9,
            WireStatus::StaleElementReference => 10,
            WireStatus::ElementNotVisible => 11,
            WireStatus::InvalidElementState => 12,
            WireStatus::UnknownError => 13,
            WireStatus::ElementIsNotSelectable => 15,
            WireStatus::JavaScriptError => 17,
            WireStatus::XPathLookupError => 19,
            WireStatus::Timeout => 21,
            WireStatus::NoSuchWindow => 23,
            WireStatus::InvalidCookieDomain => 24,
            WireStatus::UnableToSetCookie => 25,
            WireStatus::UnexpectedAlertOpen => 26,
            WireStatus::NoAlertOpenError => 27,
            WireStatus::ScriptTimeout => 28,
            WireStatus::InvalidElementCoordinates => 30,
            WireStatus::InvalidSelector => 32,
        }
    }

    /// Map a numeric code back into the table, normalizing unknown codes to
    /// `UnknownError`.
    pub fn from_code(code: i64) -> WireStatus {
        match code {
            0 => WireStatus::Success,
            6 => WireStatus::NoSuchDriver,
            7 => WireStatus::NoSuchElement,
            8 => WireStatus::NoSuchFrame,
            9 => WireStatus::UnknownCommand,
            10 => WireStatus::StaleElementReference,
            11 => WireStatus::ElementNotVisible,
            12 => WireStatus::InvalidElementState,
            13 => WireStatus::UnknownError,
            15 => WireStatus::ElementIsNotSelectable,
            17 => WireStatus::JavaScriptError,
            19 => WireStatus::XPathLookupError,
            21 => WireStatus::Timeout,
            23 => WireStatus::NoSuchWindow,
            24 => WireStatus::InvalidCookieDomain,
            25 => WireStatus::UnableToSetCookie,
            26 => WireStatus::UnexpectedAlertOpen,
            27 => WireStatus::NoAlertOpenError,
            28 => WireStatus::ScriptTimeout,
            30 => WireStatus::InvalidElementCoordinates,
            32 => WireStatus::InvalidSelector,
            _ => WireStatus::UnknownError,
        }
    }

    /// Normalize a possibly missing code, as the error layer requires.
    pub fn normalize(code: Option<i64>) -> WireStatus {
        code.map(WireStatus::from_code)
            .unwrap_or(WireStatus::UnknownError)
    }

    /// The vendor-style exception class name carried in failure payloads for
    /// compatibility. `None` serializes as `"unknown"`.
    pub fn class_name(self) -> Option<&'static str> {
        match self {
            WireStatus::Success => None,
            WireStatus::NoSuchDriver => Some("org.openqa.selenium.NoSuchSessionException"),
            WireStatus::NoSuchElement => Some("org.openqa.selenium.NoSuchElementException"),
            WireStatus::NoSuchFrame => Some("org.openqa.selenium.NoSuchFrameException"),
            WireStatus::UnknownCommand => Some("org.openqa.selenium.UnsupportedCommandException"),
            WireStatus::StaleElementReference => {
                Some("org.openqa.selenium.StaleElementReferenceException")
            }
            WireStatus::ElementNotVisible => Some("org.openqa.selenium.ElementNotVisibleException"),
            WireStatus::InvalidElementState => {
                Some("org.openqa.selenium.InvalidElementStateException")
            }
            WireStatus::UnknownError => Some("org.openqa.selenium.WebDriverException"),
            WireStatus::ElementIsNotSelectable => {
                Some("org.openqa.selenium.ElementNotSelectableException")
            }
            WireStatus::JavaScriptError => Some("org.openqa.selenium.JavascriptException"),
            WireStatus::XPathLookupError => Some("org.openqa.selenium.XPathLookupException"),
            WireStatus::Timeout => Some("org.openqa.selenium.TimeoutException"),
            WireStatus::NoSuchWindow => Some("org.openqa.selenium.NoSuchWindowException"),
            WireStatus::InvalidCookieDomain => {
                Some("org.openqa.selenium.InvalidCookieDomainException")
            }
            WireStatus::UnableToSetCookie => Some("org.openqa.selenium.UnableToSetCookieException"),
            WireStatus::UnexpectedAlertOpen => Some("org.openqa.selenium.UnhandledAlertException"),
            WireStatus::NoAlertOpenError => Some("org.openqa.selenium.NoAlertPresentException"),
            WireStatus::ScriptTimeout => Some("org.openqa.selenium.ScriptTimeoutException"),
            WireStatus::InvalidElementCoordinates => {
                Some("org.openqa.selenium.interactions.InvalidCoordinatesException")
            }
            WireStatus::InvalidSelector => Some("org.openqa.selenium.InvalidSelectorException"),
        }
    }
}

// ============================================================
// Search outcomes
// ============================================================

/// The payload of a successful search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
    /// The atom reported success but found nothing (a null value). Callers
    /// treat this as "not found yet", never as found.
    None,
    One(ElementHandle),
    Many(Vec<ElementHandle>),
}

impl SearchValue {
    fn from_payload(payload: Value) -> SearchValue {
        match payload {
            Value::Object(_) => match ElementHandle::vet(&payload) {
                Some(handle) => SearchValue::One(handle),
                None => SearchValue::None,
            },
            Value::Array(_) => serde_json::from_value::<Vec<ElementHandle>>(payload)
                .map(SearchValue::Many)
                .unwrap_or(SearchValue::None),
            _ => SearchValue::None,
        }
    }

    /// Whether the atom produced any value at all (an empty array counts).
    pub fn is_present(&self) -> bool {
        !matches!(self, SearchValue::None)
    }

    /// How many handles the value carries.
    pub fn count(&self) -> usize {
        match self {
            SearchValue::None => 0,
            SearchValue::One(_) => 1,
            SearchValue::Many(handles) => handles.len(),
        }
    }

    /// The wire representation handed to the response sink on success.
    pub fn to_wire(&self) -> Value {
        match self {
            SearchValue::None => Value::Null,
            SearchValue::One(handle) => serde_json::json!(handle),
            SearchValue::Many(handles) => serde_json::json!(handles),
        }
    }
}

/// The normalized result of one find invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Success(SearchValue),
    Failure { status: WireStatus, message: String },
}

/// Failure to interpret a script atom's result as an outcome envelope.
#[derive(Debug, thiserror::Error)]
pub enum OutcomeParseError {
    #[error("result is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("result is not an object")]
    NotAnObject,
    #[error("result has no numeric status field")]
    MissingStatus,
}

impl SearchOutcome {
    /// The catch-all precondition failure used by the find primitive.
    pub fn no_such_window() -> SearchOutcome {
        SearchOutcome::Failure {
            status: WireStatus::NoSuchWindow,
            message: "No such window".to_string(),
        }
    }

    pub fn failure(status: WireStatus, message: impl Into<String>) -> SearchOutcome {
        SearchOutcome::Failure {
            status,
            message: message.into(),
        }
    }

    /// Parse the JSON string a script atom returned into a typed outcome.
    ///
    /// This is the single place raw script results are validated; downstream
    /// code only ever sees the tagged type.
    pub fn parse(raw: &str) -> Result<SearchOutcome, OutcomeParseError> {
        let envelope: Value = serde_json::from_str(raw)?;
        let object = envelope.as_object().ok_or(OutcomeParseError::NotAnObject)?;
        let status = object
            .get("status")
            .and_then(Value::as_i64)
            .ok_or(OutcomeParseError::MissingStatus)?;
        let payload = object.get("value").cloned().unwrap_or(Value::Null);

        if status == 0 {
            return Ok(SearchOutcome::Success(SearchValue::from_payload(payload)));
        }

        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| payload.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(SearchOutcome::Failure {
            status: WireStatus::from_code(status),
            message,
        })
    }

    pub fn status(&self) -> WireStatus {
        match self {
            SearchOutcome::Success(_) => WireStatus::Success,
            SearchOutcome::Failure { status, .. } => *status,
        }
    }
}

/// The command request handed in by the dispatcher.
///
/// Only the shape this core needs: the HTTP method, the resource path, and
/// the raw body. Invalid-request error bodies embed the serialized request,
/// so the whole struct is serializable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub method: String,
    pub urn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl CommandRequest {
    pub fn new(method: impl Into<String>, urn: impl Into<String>) -> CommandRequest {
        CommandRequest {
            method: method.into(),
            urn: urn.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> CommandRequest {
        self.body = Some(body.into());
        self
    }

    /// Serialize for embedding into error messages.
    pub fn serialized(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "<unserializable request>".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strategy_aliases_resolve_to_same_variant() {
        assert_eq!(Strategy::from_wire("class name"), Some(Strategy::ClassName));
        assert_eq!(Strategy::from_wire("className"), Some(Strategy::ClassName));
        assert_eq!(Strategy::from_wire("css"), Some(Strategy::CssSelector));
        assert_eq!(
            Strategy::from_wire("partialLinkText"),
            Some(Strategy::PartialLinkText)
        );
        assert_eq!(Strategy::from_wire("xpath"), Some(Strategy::Xpath));
        assert_eq!(Strategy::from_wire("accessibility id"), None);
    }

    #[test]
    fn test_strategy_serde_accepts_aliases() {
        let canonical: Strategy = serde_json::from_value(json!("tag name")).unwrap();
        let alias: Strategy = serde_json::from_value(json!("tagName")).unwrap();
        assert_eq!(canonical, alias);
        // Canonical form is what serializes back out.
        assert_eq!(serde_json::to_value(alias).unwrap(), json!("tag name"));
    }

    #[test]
    fn test_raw_locator_from_body() {
        let locator = RawLocator::from_body(Some(r#"{"using":"id","value":"main"}"#));
        assert_eq!(locator.using.as_deref(), Some("id"));
        assert_eq!(locator.value.as_deref(), Some("main"));

        // Missing and unparsable bodies both yield the implicit empty locator.
        assert_eq!(RawLocator::from_body(None), RawLocator::default());
        assert_eq!(RawLocator::from_body(Some("not json")), RawLocator::default());
    }

    #[test]
    fn test_raw_locator_validation() {
        let ok = RawLocator {
            using: Some("css selector".into()),
            value: Some(".item".into()),
        };
        let descriptor = ok.validate().unwrap();
        assert_eq!(descriptor.using, Strategy::CssSelector);
        assert_eq!(descriptor.value, ".item");

        let missing_value = RawLocator {
            using: Some("id".into()),
            value: None,
        };
        assert!(missing_value.validate().is_none());

        let bad_strategy = RawLocator {
            using: Some("telepathy".into()),
            value: Some("x".into()),
        };
        assert!(bad_strategy.validate().is_none());
    }

    #[test]
    fn test_element_handle_vetting() {
        assert_eq!(
            ElementHandle::vet(&json!({"ELEMENT": ":wdc:1"})),
            Some(ElementHandle::new(":wdc:1"))
        );
        assert_eq!(ElementHandle::vet(&json!({"ELEMENT": ""})), None);
        assert_eq!(ElementHandle::vet(&json!({"element": "1"})), None);
        assert_eq!(ElementHandle::vet(&json!("not an object")), None);
        assert_eq!(ElementHandle::vet(&json!(42)), None);
    }

    #[test]
    fn test_status_table_roundtrip() {
        for status in WireStatus::ALL {
            assert_eq!(WireStatus::from_code(status.code()), status);
        }
        assert_eq!(WireStatus::ALL.len(), 21);
    }

    #[test]
    fn test_status_normalization_fallback() {
        assert_eq!(WireStatus::from_code(99), WireStatus::UnknownError);
        assert_eq!(WireStatus::from_code(-1), WireStatus::UnknownError);
        assert_eq!(WireStatus::normalize(None), WireStatus::UnknownError);
        assert_eq!(WireStatus::normalize(Some(7)), WireStatus::NoSuchElement);
    }

    #[test]
    fn test_class_names() {
        assert_eq!(
            WireStatus::NoSuchElement.class_name(),
            Some("org.openqa.selenium.NoSuchElementException")
        );
        assert_eq!(WireStatus::Success.class_name(), None);
        // Unrecognized codes normalize first, then resolve a class.
        assert_eq!(
            WireStatus::from_code(999).class_name(),
            Some("org.openqa.selenium.WebDriverException")
        );
    }

    #[test]
    fn test_parse_success_null_value() {
        let outcome = SearchOutcome::parse(r#"{"status":0,"value":null}"#).unwrap();
        assert_eq!(outcome, SearchOutcome::Success(SearchValue::None));
    }

    #[test]
    fn test_parse_success_single_handle() {
        let outcome = SearchOutcome::parse(r#"{"status":0,"value":{"ELEMENT":"5"}}"#).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Success(SearchValue::One(ElementHandle::new("5")))
        );
    }

    #[test]
    fn test_parse_success_handle_array() {
        let outcome =
            SearchOutcome::parse(r#"{"status":0,"value":[{"ELEMENT":"1"},{"ELEMENT":"2"}]}"#)
                .unwrap();
        match outcome {
            SearchOutcome::Success(SearchValue::Many(handles)) => {
                assert_eq!(handles.len(), 2);
                assert_eq!(handles[0].reference, "1");
            }
            other => panic!("expected Many, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_failure_extracts_message() {
        let outcome = SearchOutcome::parse(
            r#"{"status":10,"value":{"message":"element went stale"}}"#,
        )
        .unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::failure(WireStatus::StaleElementReference, "element went stale")
        );

        // Bare string values are carried as the message too.
        let outcome = SearchOutcome::parse(r#"{"status":23,"value":"No such window"}"#).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::failure(WireStatus::NoSuchWindow, "No such window")
        );
    }

    #[test]
    fn test_parse_rejects_bad_envelopes() {
        assert!(matches!(
            SearchOutcome::parse("garbage"),
            Err(OutcomeParseError::Json(_))
        ));
        assert!(matches!(
            SearchOutcome::parse("[1,2]"),
            Err(OutcomeParseError::NotAnObject)
        ));
        assert!(matches!(
            SearchOutcome::parse(r#"{"value":null}"#),
            Err(OutcomeParseError::MissingStatus)
        ));
        assert!(matches!(
            SearchOutcome::parse(r#"{"status":"ok"}"#),
            Err(OutcomeParseError::MissingStatus)
        ));
    }

    #[test]
    fn test_odd_success_payload_is_not_found() {
        // A success-coded result carrying something that is neither null, a
        // handle, nor a handle array counts as "not found yet".
        let outcome = SearchOutcome::parse(r#"{"status":0,"value":"stray"}"#).unwrap();
        assert_eq!(outcome, SearchOutcome::Success(SearchValue::None));

        let outcome = SearchOutcome::parse(r#"{"status":0,"value":{"node":3}}"#).unwrap();
        assert_eq!(outcome, SearchOutcome::Success(SearchValue::None));
    }

    #[test]
    fn test_request_serialization() {
        let request = CommandRequest::new("POST", "/session/42/element")
            .with_body(r#"{"using":"id","value":"go"}"#);
        let serialized = request.serialized();
        assert!(serialized.contains("\"method\":\"POST\""));
        assert!(serialized.contains("/session/42/element"));
    }
}
