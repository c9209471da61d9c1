//! The engine facade.
//!
//! [`SpecEngine`] owns the document under test together with every piece
//! of state the assertion runtime keeps between steps: layout overrides,
//! HTTP mocks, invocation counts, frame waits and the report sink. The
//! driving runtime creates one engine per run and calls into it step by
//! step; nothing lives in process globals.

use crate::assertions;
use crate::config::EngineConfig;
use crate::counter::InvocationCounter;
use crate::dom::{ClientRect, Dom};
use crate::event::DispatchTarget;
use crate::frame::{FrameScheduler, NextFrame};
use crate::http_mock::{Interception, MockExpectation, MockResults, MockStore, ObservedRequest};
use crate::interaction;
use crate::layout::{Geometry, LayoutOverride, LayoutOverrides};
use crate::outcome::Outcome;
use crate::ports::{self, AppPorts, PortRegistry};
use crate::report::ReportSink;
use crate::test_id::TestId;
use serde_json::Value;
use tracing::debug;

/// Assertion and interaction runtime bound to one document
#[derive(Debug)]
pub struct SpecEngine<D: Dom, P: AppPorts = PortRegistry> {
    dom: D,
    ports: P,
    config: EngineConfig,
    layout: LayoutOverrides,
    mocks: MockStore,
    counter: InvocationCounter,
    frames: FrameScheduler,
    reporter: ReportSink,
}

impl<D: Dom> SpecEngine<D> {
    /// Create an engine whose app exposes no ports yet
    #[must_use]
    pub fn new(dom: D, config: EngineConfig) -> Self {
        Self::with_ports(dom, PortRegistry::new(), config)
    }
}

impl<D: Dom, P: AppPorts> SpecEngine<D, P> {
    /// Create an engine with the app's port surface
    #[must_use]
    pub fn with_ports(dom: D, ports: P, config: EngineConfig) -> Self {
        let mocks = MockStore::new().with_unhandled_response(config.unhandled_response.clone());
        Self {
            dom,
            ports,
            config,
            layout: LayoutOverrides::new(),
            mocks,
            counter: InvocationCounter::new(),
            frames: FrameScheduler::new(),
            reporter: ReportSink::new(),
        }
    }

    /// The document under test
    #[must_use]
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable access to the document under test
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// The app's port surface
    #[must_use]
    pub const fn ports(&self) -> &P {
        &self.ports
    }

    /// Mutable access to the app's port surface
    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn finish(&self, step: &str, outcome: Outcome) -> Outcome {
        debug!(step, outcome = outcome.label(), "step evaluated");
        if self.config.color.should_color() {
            outcome
        } else {
            outcome.plain()
        }
    }

    // Layout

    /// Replace the layout overrides wholesale
    pub fn set_layout<I, E>(&mut self, entries: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<LayoutOverride>,
    {
        self.layout.set(entries);
    }

    /// Drop every layout override
    pub fn clear_layout(&mut self) {
        self.layout.clear();
    }

    /// Geometry view combining overrides and native layout
    #[must_use]
    pub const fn geometry(&self) -> Geometry<'_, D> {
        self.layout.geometry(&self.dom)
    }

    /// Bounding rectangle of the first match; zeroed on any failure
    #[must_use]
    pub fn query_rect(&self, selector: &str) -> ClientRect {
        self.geometry().query_rect(selector)
    }

    /// Tag name of the topmost element at `(x, y)`
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<String> {
        self.geometry().hit_test(x, y)
    }

    // Element assertions

    /// Element text includes `value`
    #[must_use]
    pub fn contains_text(&self, value: &str, selector: &str) -> Outcome {
        self.finish("contains_text", assertions::contains_text(&self.dom, value, selector))
    }

    /// Attribute includes `value`
    #[must_use]
    pub fn attribute_contains(&self, attribute: &str, value: &str, selector: &str) -> Outcome {
        self.finish(
            "attribute_contains",
            assertions::attribute_contains(&self.dom, attribute, value, selector),
        )
    }

    /// Attribute equals `value`
    #[must_use]
    pub fn attribute_equals(&self, attribute: &str, value: &str, selector: &str) -> Outcome {
        self.finish(
            "attribute_equals",
            assertions::attribute_equals(&self.dom, attribute, value, selector),
        )
    }

    /// Element has `class`
    #[must_use]
    pub fn class_present(&self, class: &str, selector: &str) -> Outcome {
        self.finish("class_present", assertions::class_present(&self.dom, class, selector))
    }

    /// Computed style equals `value`
    #[must_use]
    pub fn style_equals(&self, style: &str, value: &str, selector: &str) -> Outcome {
        self.finish("style_equals", assertions::style_equals(&self.dom, style, value, selector))
    }

    /// Inline style equals `value`
    #[must_use]
    pub fn inline_style_equals(&self, style: &str, value: &str, selector: &str) -> Outcome {
        self.finish(
            "inline_style_equals",
            assertions::inline_style_equals(&self.dom, style, value, selector),
        )
    }

    /// Form value includes `text`
    #[must_use]
    pub fn value_contains(&self, text: &str, selector: &str) -> Outcome {
        self.finish("value_contains", assertions::value_contains(&self.dom, text, selector))
    }

    /// Form value equals `text`
    #[must_use]
    pub fn value_equals(&self, text: &str, selector: &str) -> Outcome {
        self.finish("value_equals", assertions::value_equals(&self.dom, text, selector))
    }

    /// Some element matches `selector`
    #[must_use]
    pub fn element_present(&self, selector: &str) -> Outcome {
        self.finish("element_present", assertions::element_present(&self.dom, selector))
    }

    /// Element is disabled
    #[must_use]
    pub fn element_disabled(&self, selector: &str) -> Outcome {
        self.finish("element_disabled", assertions::element_disabled(&self.dom, selector))
    }

    /// Element is checked
    #[must_use]
    pub fn checkbox_checked(&self, selector: &str) -> Outcome {
        self.finish("checkbox_checked", assertions::checkbox_checked(&self.dom, selector))
    }

    /// Element is not hidden by CSS
    #[must_use]
    pub fn element_visible(&self, selector: &str) -> Outcome {
        self.finish("element_visible", assertions::element_visible(&self.dom, selector))
    }

    /// Attribute of the first match
    ///
    /// # Errors
    ///
    /// Returns the resolver's Error outcome when the element is missing.
    pub fn get_attribute(
        &self,
        attribute: &str,
        selector: &str,
    ) -> Result<Option<String>, Outcome> {
        assertions::get_attribute(&self.dom, attribute, selector)
            .map_err(|outcome| self.finish("get_attribute", outcome))
    }

    // Document assertions

    /// Title includes `text`
    #[must_use]
    pub fn title_contains(&self, text: &str) -> Outcome {
        self.finish("title_contains", assertions::title_contains(&self.dom, text))
    }

    /// Title equals `text`
    #[must_use]
    pub fn title_equals(&self, text: &str) -> Outcome {
        self.finish("title_equals", assertions::title_equals(&self.dom, text))
    }

    /// Location includes `text`
    #[must_use]
    pub fn url_contains(&self, text: &str) -> Outcome {
        self.finish("url_contains", assertions::url_contains(&self.dom, text))
    }

    /// Location equals `text`
    #[must_use]
    pub fn url_equals(&self, text: &str) -> Outcome {
        self.finish("url_equals", assertions::url_equals(&self.dom, text))
    }

    /// Body markup includes `text`
    #[must_use]
    pub fn body_contains(&self, text: &str) -> Outcome {
        self.finish("body_contains", assertions::body_contains(&self.dom, text))
    }

    /// Body markup equals `text`
    #[must_use]
    pub fn body_equals(&self, text: &str) -> Outcome {
        self.finish("body_equals", assertions::body_equals(&self.dom, text))
    }

    /// Pass embedding the body markup
    #[must_use]
    pub fn log_body(&self) -> Outcome {
        self.finish("log_body", assertions::log_body(&self.dom))
    }

    /// Document title
    #[must_use]
    pub fn get_title(&self) -> String {
        self.dom.title()
    }

    /// Current location
    #[must_use]
    pub fn get_url(&self) -> String {
        self.dom.location()
    }

    /// Body markup
    #[must_use]
    pub fn get_body(&self) -> String {
        self.dom.body_html()
    }

    // Interactions

    /// Click the first match
    pub fn click(&mut self, selector: &str) -> Outcome {
        let outcome = interaction::click(&mut self.dom, selector, self.config.click_mouse_events);
        self.finish("click", outcome)
    }

    /// Set the form value
    pub fn set_value(&mut self, value: &str, selector: &str) -> Outcome {
        let outcome = interaction::set_value(&mut self.dom, value, selector);
        self.finish("set_value", outcome)
    }

    /// Set the form value and fire `event_name`
    pub fn set_value_and_dispatch(
        &mut self,
        value: &str,
        selector: &str,
        event_name: &str,
    ) -> Outcome {
        let outcome =
            interaction::set_value_and_dispatch(&mut self.dom, value, selector, event_name);
        self.finish("set_value_and_dispatch", outcome)
    }

    /// Clear the form value
    pub fn clear_value(&mut self, selector: &str) -> Outcome {
        let outcome = interaction::clear_value(&mut self.dom, selector);
        self.finish("clear_value", outcome)
    }

    /// Clear the form value and fire `event_name`
    pub fn clear_value_and_dispatch(&mut self, selector: &str, event_name: &str) -> Outcome {
        let outcome = interaction::clear_value_and_dispatch(&mut self.dom, selector, event_name);
        self.finish("clear_value_and_dispatch", outcome)
    }

    /// Dispatch a synthetic event on `target`
    pub fn dispatch_event(
        &mut self,
        event_type: &str,
        data: &Value,
        target: impl Into<DispatchTarget>,
    ) -> Outcome {
        let outcome = interaction::dispatch_event(&mut self.dom, event_type, data, &target.into());
        self.finish("dispatch_event", outcome)
    }

    /// Send `payload` through the app port `name`
    pub fn input_via_port(&mut self, name: &str, payload: &Value) -> Outcome {
        let outcome = ports::input_via_port(&mut self.ports, name, payload);
        self.finish("input_via_port", outcome)
    }

    // HTTP mocks

    /// Arm HTTP mocking for `test_id`
    pub fn mock_http_requests(
        &mut self,
        test_id: TestId,
        expectations: impl IntoIterator<Item = MockExpectation>,
    ) {
        self.mocks.arm(test_id, expectations);
    }

    /// Classify an outbound request
    pub fn intercept(&mut self, request: &ObservedRequest) -> Interception {
        self.mocks.handle(request)
    }

    /// Matched and unhandled requests for `test_id`
    #[must_use]
    pub fn mock_results(&self, test_id: TestId) -> MockResults {
        self.mocks.results(test_id)
    }

    /// Drain the results for `test_id` at the end of the test
    pub fn take_mock_results(&mut self, test_id: TestId) -> MockResults {
        self.mocks.take_results(test_id)
    }

    // Runtime helpers

    /// Count one more invocation of `key`
    pub fn invocation_count(&mut self, key: &str) -> u64 {
        self.counter.increment(key)
    }

    /// Wait for the next animation frame
    pub fn next_frame(&mut self) -> NextFrame {
        self.frames.request_frame()
    }

    /// Advance one animation frame
    pub fn tick_frame(&mut self) -> u64 {
        self.frames.tick()
    }

    /// Install the host's report callback
    pub fn register_reporter(&mut self, callback: impl FnMut(Value) + 'static) {
        self.reporter.register(callback);
    }

    /// Forward a report to the host
    pub fn report(&mut self, report: Value) {
        self.reporter.report(report);
    }
}
