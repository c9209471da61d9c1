//! HTTP request mocking.
//!
//! A test arms the store with an ordered list of expectations. Every
//! intercepted request consumes the head of that queue: it is matched when
//! method and URL agree exactly (and, for POST and PUT, the expected entity
//! if a non-empty one was given), otherwise it is recorded as unhandled.
//! Out-of-order calls therefore leave every later call unhandled too.
//!
//! Results accumulate per [`TestId`] and are owned by the store rather than
//! by process globals.

use crate::result::SpecdomError;
use crate::test_id::TestId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// HTTP methods for request matching.
///
/// Method names are case-sensitive: `get` is an [`HttpMethod::Other`] and
/// does not match `GET`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// PATCH request
    Patch,
    /// HEAD request
    Head,
    /// OPTIONS request
    Options,
    /// Any other method token, kept verbatim
    Other(String),
}

impl HttpMethod {
    /// Convert to string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Other(method) => method,
        }
    }

    /// Whether the request body takes part in matching
    #[must_use]
    pub const fn compares_entity(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl FromStr for HttpMethod {
    type Err = SpecdomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let is_token = !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c));
        if !is_token {
            return Err(SpecdomError::InvalidMethod {
                method: s.to_string(),
            });
        }
        Ok(match s {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            other => Self::Other(other.to_string()),
        })
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = SpecdomError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Other(method) => method,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canned HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            body: String::new(),
        }
    }
}

impl MockResponse {
    /// Create an empty 200 response
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a 200 response with a body
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Set status code
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// One expected request and the response it receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockExpectation {
    /// Expected method
    pub method: HttpMethod,
    /// Expected URL, compared exactly
    pub url: String,
    /// Expected body for POST and PUT; `None` or empty accepts any body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Response served on a match
    #[serde(default)]
    pub response: MockResponse,
}

impl MockExpectation {
    /// Create an expectation answered with an empty 200
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            entity: None,
            response: MockResponse::default(),
        }
    }

    /// Expect a GET request
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Expect a POST request
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Expect a PUT request
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Expect a DELETE request
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Require an exact request body; an empty entity requires nothing
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the canned response
    #[must_use]
    pub fn respond(mut self, response: MockResponse) -> Self {
        self.response = response;
        self
    }

    /// Check whether `request` satisfies this expectation
    #[must_use]
    pub fn matches(&self, request: &ObservedRequest) -> bool {
        if self.method != request.method || self.url != request.url {
            return false;
        }
        if !request.method.compares_entity() {
            return true;
        }
        match self.entity.as_deref() {
            None | Some("") => true,
            Some(expected) => request.body.as_deref() == Some(expected),
        }
    }
}

/// An outbound request seen by the interceptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedRequest {
    /// Request method
    pub method: HttpMethod,
    /// Request URL
    pub url: String,
    /// Request body, if any
    #[serde(default)]
    pub body: Option<String>,
}

impl ObservedRequest {
    /// Create a request without a body
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Attach a body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A request that did not match the expectation at the head of the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnhandledRequest {
    /// Request method
    pub method: HttpMethod,
    /// Request URL
    pub url: String,
    /// Request body, if any
    pub entity: Option<String>,
    /// Response the request fell through to
    pub response: MockResponse,
}

/// Accumulated outcome of a test's HTTP traffic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResults {
    /// Matched expectations, in match order
    pub called: Vec<MockExpectation>,
    /// Requests that matched nothing, in arrival order
    pub unhandled: Vec<UnhandledRequest>,
}

impl MockResults {
    /// Check that nothing went unhandled
    #[must_use]
    pub fn all_handled(&self) -> bool {
        self.unhandled.is_empty()
    }
}

/// How an intercepted request was classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// The head expectation matched; serve its response
    Matched(MockResponse),
    /// No match; the request falls through to this response
    Unhandled(MockResponse),
    /// No test has armed the store
    Passthrough,
}

impl Interception {
    /// Response to serve, if the store produced one
    #[must_use]
    pub fn response(&self) -> Option<&MockResponse> {
        match self {
            Self::Matched(r) | Self::Unhandled(r) => Some(r),
            Self::Passthrough => None,
        }
    }
}

/// Per-test expectation queue and results
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    active: Option<TestId>,
    queue: VecDeque<MockExpectation>,
    results: HashMap<TestId, MockResults>,
    unhandled_response: MockResponse,
}

impl MockStore {
    /// Create an unarmed store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response recorded for unhandled requests
    #[must_use]
    pub fn with_unhandled_response(mut self, response: MockResponse) -> Self {
        self.unhandled_response = response;
        self
    }

    /// Start intercepting for `test_id`.
    ///
    /// Replaces any queue left by an earlier test. Results already
    /// accumulated for `test_id` are kept.
    pub fn arm(
        &mut self,
        test_id: TestId,
        expectations: impl IntoIterator<Item = MockExpectation>,
    ) {
        self.queue = expectations.into_iter().collect();
        self.results.entry(test_id).or_default();
        self.active = Some(test_id);
        debug!(test_id = %test_id, expected = self.queue.len(), "http mocks armed");
    }

    /// Test currently receiving intercepted traffic
    #[must_use]
    pub const fn active(&self) -> Option<TestId> {
        self.active
    }

    /// Expectations not yet consumed
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Classify an intercepted request against the head of the queue.
    ///
    /// The head is consumed whether or not it matches.
    pub fn handle(&mut self, request: &ObservedRequest) -> Interception {
        let Some(test_id) = self.active else {
            trace!(
                method = %request.method,
                url = %request.url,
                "request passed through unarmed store"
            );
            return Interception::Passthrough;
        };
        let head = self.queue.pop_front();
        let results = self.results.entry(test_id).or_default();
        match head {
            Some(expected) if expected.matches(request) => {
                debug!(
                    test_id = %test_id,
                    method = %request.method,
                    url = %request.url,
                    "request matched"
                );
                let response = expected.response.clone();
                results.called.push(expected);
                Interception::Matched(response)
            }
            head => {
                warn!(
                    test_id = %test_id,
                    method = %request.method,
                    url = %request.url,
                    expected = ?head.as_ref().map(|e| format!("{} {}", e.method, e.url)),
                    "unhandled request"
                );
                results.unhandled.push(UnhandledRequest {
                    method: request.method.clone(),
                    url: request.url.clone(),
                    entity: request.body.clone(),
                    response: self.unhandled_response.clone(),
                });
                Interception::Unhandled(self.unhandled_response.clone())
            }
        }
    }

    /// Results accumulated for `test_id`; empty when it never armed
    #[must_use]
    pub fn results(&self, test_id: TestId) -> MockResults {
        self.results.get(&test_id).cloned().unwrap_or_default()
    }

    /// Remove and return the results for `test_id`.
    ///
    /// Disarms the store if `test_id` is the active test.
    pub fn take_results(&mut self, test_id: TestId) -> MockResults {
        if self.active == Some(test_id) {
            self.active = None;
            self.queue.clear();
        }
        self.results.remove(&test_id).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get(url: &str) -> ObservedRequest {
        ObservedRequest::new(HttpMethod::Get, url)
    }

    mod http_method_tests {
        use super::*;

        #[test]
        fn test_from_str() {
            assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
            assert_eq!("DELETE".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
            let err = "GE T".parse::<HttpMethod>().unwrap_err();
            assert_eq!(err.to_string(), "Invalid HTTP method: GE T");
            assert!("".parse::<HttpMethod>().is_err());
        }

        #[test]
        fn test_unknown_methods_are_kept_verbatim() {
            let method = "TRACE".parse::<HttpMethod>().unwrap();
            assert_eq!(method, HttpMethod::Other("TRACE".to_string()));
            assert_eq!(method.as_str(), "TRACE");
            assert_eq!(method.to_string(), "TRACE");
            assert!(!method.compares_entity());
        }

        #[test]
        fn test_parse_is_case_sensitive() {
            let lower = "get".parse::<HttpMethod>().unwrap();
            assert_eq!(lower, HttpMethod::Other("get".to_string()));
            assert_ne!(lower, HttpMethod::Get);
        }

        #[test]
        fn test_serde_as_method_string() {
            assert_eq!(serde_json::to_string(&HttpMethod::Put).unwrap(), "\"PUT\"");
            let m: HttpMethod = serde_json::from_str("\"PATCH\"").unwrap();
            assert_eq!(m, HttpMethod::Patch);
            let custom: HttpMethod = serde_json::from_str("\"PURGE\"").unwrap();
            assert_eq!(serde_json::to_string(&custom).unwrap(), "\"PURGE\"");
            assert!(serde_json::from_str::<HttpMethod>("\"\"").is_err());
        }

        #[test]
        fn test_compares_entity() {
            assert!(HttpMethod::Post.compares_entity());
            assert!(HttpMethod::Put.compares_entity());
            assert!(!HttpMethod::Patch.compares_entity());
            assert!(!HttpMethod::Get.compares_entity());
        }
    }

    mod expectation_tests {
        use super::*;

        #[test]
        fn test_method_and_url_must_match() {
            let e = MockExpectation::get("/api/items");
            assert!(e.matches(&get("/api/items")));
            assert!(!e.matches(&get("/api/items?page=2")));
            assert!(!e.matches(&ObservedRequest::new(HttpMethod::Delete, "/api/items")));
        }

        #[test]
        fn test_entity_checked_for_post() {
            let e = MockExpectation::post("/api/items").with_entity("{\"name\":\"a\"}");
            let ok =
                ObservedRequest::new(HttpMethod::Post, "/api/items").with_body("{\"name\":\"a\"}");
            let bad = ObservedRequest::new(HttpMethod::Post, "/api/items").with_body("{}");
            assert!(e.matches(&ok));
            assert!(!e.matches(&bad));
        }

        #[test]
        fn test_missing_entity_accepts_any_body() {
            let e = MockExpectation::put("/api/items/1");
            let req = ObservedRequest::new(HttpMethod::Put, "/api/items/1").with_body("anything");
            assert!(e.matches(&req));
        }

        #[test]
        fn test_empty_entity_accepts_any_body() {
            let e = MockExpectation::post("/x").with_entity("");
            let req = ObservedRequest::new(HttpMethod::Post, "/x").with_body("{\"a\":1}");
            assert!(e.matches(&req));
            let from_json: MockExpectation =
                serde_json::from_str(r#"{"method":"PUT","url":"/x","entity":""}"#).unwrap();
            assert!(from_json.matches(&ObservedRequest::new(HttpMethod::Put, "/x").with_body("b")));
        }

        #[test]
        fn test_method_compared_exactly() {
            let e = MockExpectation::get("/x");
            let lower = ObservedRequest::new("get".parse().unwrap(), "/x");
            assert!(!e.matches(&lower));
            let custom = MockExpectation::new(HttpMethod::Other("get".to_string()), "/x");
            assert!(custom.matches(&lower));
        }

        #[test]
        fn test_entity_ignored_for_other_methods() {
            let e = MockExpectation::delete("/api/items/1").with_entity("ignored");
            assert!(e.matches(&ObservedRequest::new(HttpMethod::Delete, "/api/items/1")));
        }

        #[test]
        fn test_deserialize_defaults() {
            let e: MockExpectation =
                serde_json::from_str(r#"{"method":"GET","url":"/x"}"#).unwrap();
            assert_eq!(e.entity, None);
            assert_eq!(e.response, MockResponse::default());
        }
    }

    mod store_tests {
        use super::*;

        fn armed() -> MockStore {
            let mut store = MockStore::new();
            store.arm(
                TestId(0),
                [
                    MockExpectation::get("/a").respond(MockResponse::text("A").with_status(201)),
                    MockExpectation::get("/b").respond(MockResponse::text("B")),
                ],
            );
            store
        }

        #[test]
        fn test_unarmed_passes_through() {
            let mut store = MockStore::new();
            assert_eq!(store.handle(&get("/a")), Interception::Passthrough);
            assert_eq!(store.results(TestId(0)), MockResults::default());
        }

        #[test]
        fn test_in_order_requests_match() {
            let mut store = armed();
            let first = store.handle(&get("/a"));
            assert_eq!(first, Interception::Matched(MockResponse::text("A").with_status(201)));
            store.handle(&get("/b"));
            let results = store.results(TestId(0));
            let urls: Vec<_> = results.called.iter().map(|e| e.url.as_str()).collect();
            assert_eq!(urls, vec!["/a", "/b"]);
            assert!(results.all_handled());
        }

        #[test]
        fn test_out_of_order_requests_are_all_unhandled() {
            let mut store = armed();
            store.handle(&get("/b"));
            store.handle(&get("/a"));
            let results = store.results(TestId(0));
            assert!(results.called.is_empty());
            let urls: Vec<_> = results.unhandled.iter().map(|u| u.url.as_str()).collect();
            assert_eq!(urls, vec!["/b", "/a"]);
            assert_eq!(store.pending(), 0);
        }

        #[test]
        fn test_extra_request_is_unhandled_with_default_response() {
            let mut store =
                MockStore::new().with_unhandled_response(MockResponse::new().with_status(404));
            store.arm(TestId(3), Vec::<MockExpectation>::new());
            let reply =
                store.handle(&ObservedRequest::new(HttpMethod::Post, "/x").with_body("b"));
            assert_eq!(reply.response().map(|r| r.status), Some(404));
            let unhandled = &store.results(TestId(3)).unhandled[0];
            assert_eq!(unhandled.entity.as_deref(), Some("b"));
            assert_eq!(unhandled.response.status, 404);
        }

        #[test]
        fn test_uncommon_method_is_recorded_unhandled() {
            let mut store = armed();
            let request = ObservedRequest::new("TRACE".parse().unwrap(), "/a");
            assert!(matches!(store.handle(&request), Interception::Unhandled(_)));
            let unhandled = &store.results(TestId(0)).unhandled[0];
            assert_eq!(unhandled.method.as_str(), "TRACE");
            let json = serde_json::to_value(store.results(TestId(0))).unwrap();
            assert_eq!(json["unhandled"][0]["method"], "TRACE");
        }

        #[test]
        fn test_rearm_keeps_results_and_replaces_queue() {
            let mut store = armed();
            store.handle(&get("/a"));
            store.arm(TestId(0), [MockExpectation::get("/c")]);
            assert_eq!(store.pending(), 1);
            store.handle(&get("/c"));
            assert_eq!(store.results(TestId(0)).called.len(), 2);
        }

        #[test]
        fn test_results_are_per_test() {
            let mut store = armed();
            store.handle(&get("/a"));
            store.arm(TestId(1), [MockExpectation::get("/z")]);
            store.handle(&get("/nope"));
            assert_eq!(store.results(TestId(0)).called.len(), 1);
            assert_eq!(store.results(TestId(1)).unhandled.len(), 1);
        }

        #[test]
        fn test_results_is_a_pure_read() {
            let mut store = armed();
            store.handle(&get("/a"));
            assert_eq!(store.results(TestId(0)), store.results(TestId(0)));
        }

        #[test]
        fn test_take_results_drains_and_disarms() {
            let mut store = armed();
            store.handle(&get("/a"));
            assert_eq!(store.take_results(TestId(0)).called.len(), 1);
            assert_eq!(store.results(TestId(0)), MockResults::default());
            assert_eq!(store.active(), None);
            assert_eq!(store.handle(&get("/b")), Interception::Passthrough);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_in_order_traffic_is_fully_called(
                paths in prop::collection::vec("[a-z]{1,8}", 0..12),
            ) {
                let mut store = MockStore::new();
                store.arm(TestId(0), paths.iter().map(|p| MockExpectation::get(format!("/{p}"))));
                for p in &paths {
                    store.handle(&get(&format!("/{p}")));
                }
                let results = store.results(TestId(0));
                prop_assert!(results.all_handled());
                let called: Vec<_> = results.called.iter().map(|e| e.url.clone()).collect();
                let expected: Vec<_> = paths.iter().map(|p| format!("/{p}")).collect();
                prop_assert_eq!(called, expected);
            }

            #[test]
            fn prop_every_request_is_classified_once(
                expected in prop::collection::vec("[ab]", 0..8),
                sent in prop::collection::vec("[ab]", 0..8),
            ) {
                let mut store = MockStore::new();
                store.arm(TestId(0), expected.iter().map(|p| MockExpectation::get(p.clone())));
                for p in &sent {
                    store.handle(&get(p));
                }
                let results = store.results(TestId(0));
                prop_assert_eq!(results.called.len() + results.unhandled.len(), sent.len());
                prop_assert_eq!(store.pending(), expected.len().saturating_sub(sent.len()));
            }
        }
    }
}
