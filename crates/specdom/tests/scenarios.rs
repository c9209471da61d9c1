//! End-to-end scenarios against the in-memory document.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use specdom::{
    strip_markup, ClientRect, ColorChoice, EngineConfig, HttpMethod, Interception, LayoutRect,
    MemoryDom, MockExpectation, MockResponse, NodeId, ObservedRequest, Outcome, SpecEngine, TestId,
};

struct App {
    engine: SpecEngine<MemoryDom>,
    panel: NodeId,
}

/// A tabbed page with a search form
fn app() -> App {
    let mut dom = MemoryDom::new();
    dom.set_title("Tabs");
    dom.set_location("http://localhost/#/tabs");
    let body = dom.body();

    let nav = dom.append_element(body, "nav");
    for (i, label) in ["One", "Two", "Three"].iter().enumerate() {
        let tab = dom.append_element(nav, "a");
        dom.set_attribute(tab, "id", &format!("tab-{}", i + 1));
        dom.add_class(tab, "tab");
        if i == 0 {
            dom.add_class(tab, "active");
        }
        dom.append_text(tab, label);
    }

    let form = dom.append_element(body, "form");
    let input = dom.append_element(form, "input");
    dom.set_attribute(input, "id", "input");
    let remember = dom.append_element(form, "input");
    dom.set_attribute(remember, "id", "remember");
    dom.set_attribute(remember, "type", "checkbox");
    let submit = dom.append_element(form, "button");
    dom.set_attribute(submit, "id", "submit");
    dom.set_disabled(submit, true);

    let panel = dom.append_element(body, "section");
    dom.set_attribute(panel, "id", "panel");
    let note = dom.append_element(panel, "p");
    dom.set_attribute(note, "id", "note");
    dom.append_text(note, "Nothing yet");

    App {
        engine: SpecEngine::new(dom, EngineConfig::new().with_color(ColorChoice::Never)),
        panel,
    }
}

mod dom_assertion_scenarios {
    use super::*;

    #[test]
    fn set_value_then_read_back() {
        let mut app = app();
        assert!(app.engine.set_value_and_dispatch("abc", "#input", "input").is_pass());
        assert_eq!(
            app.engine.value_equals("abc", "#input"),
            Outcome::pass("Value of element #input equals \"abc\"")
        );
    }

    #[test]
    fn missing_class_names_selector_and_class() {
        let app = app();
        let outcome = app.engine.class_present("active", "#tab-2");
        assert!(outcome.is_fail());
        assert!(outcome.message().contains("#tab-2"));
        assert!(outcome.message().contains("active"));
        assert!(app.engine.class_present("active", "#tab-1").is_pass());
    }

    #[test]
    fn every_assertion_on_missing_selector_is_error() {
        let app = app();
        let e = &app.engine;
        let s = "#does-not-exist";
        for outcome in [
            e.contains_text("x", s),
            e.attribute_contains("id", "x", s),
            e.attribute_equals("id", "x", s),
            e.class_present("x", s),
            e.style_equals("display", "block", s),
            e.inline_style_equals("display", "block", s),
            e.value_contains("x", s),
            e.value_equals("x", s),
            e.element_present(s),
            e.element_disabled(s),
            e.checkbox_checked(s),
            e.element_visible(s),
        ] {
            assert_eq!(outcome, Outcome::error("Element not found: #does-not-exist"));
        }
    }

    #[test]
    fn form_state() {
        let mut app = app();
        assert!(app.engine.element_disabled("#submit").is_pass());
        assert!(app.engine.checkbox_checked("#remember").is_fail());
        assert!(app.engine.click("#remember").is_pass());
        assert!(app.engine.checkbox_checked("#remember").is_pass());
        assert!(app.engine.clear_value_and_dispatch("#input", "input").is_pass());
        assert!(app.engine.value_equals("", "#input").is_pass());
    }

    #[test]
    fn hidden_panel_hides_children() {
        let mut app = app();
        assert!(app.engine.element_visible("#note").is_pass());
        let panel = app.panel;
        app.engine.dom_mut().set_inline_style(panel, "display", "none");
        assert_eq!(
            app.engine.element_visible("#panel"),
            Outcome::fail("Element #panel is hidden by display: none")
        );
        assert_eq!(
            app.engine.element_visible("#note"),
            Outcome::fail("Element #note is hidden by parent element.")
        );
    }

    #[test]
    fn document_level_checks() {
        let app = app();
        assert!(app.engine.title_equals("Tabs").is_pass());
        assert!(app.engine.url_contains("#/tabs").is_pass());
        assert!(app.engine.body_contains("Nothing yet").is_pass());
        assert!(app.engine.contains_text("Two", "nav > #tab-2").is_pass());
    }
}

mod layout_scenarios {
    use super::*;

    #[test]
    fn override_rect_is_returned_exactly() {
        let mut app = app();
        app.engine.set_layout([("#panel", LayoutRect::new(100.0, 0.0, 640.0, 480.0))]);
        assert_eq!(
            app.engine.query_rect("#panel"),
            ClientRect::new(100.0, 0.0, 640.0, 480.0)
        );
        assert_eq!(app.engine.query_rect("#nowhere"), ClientRect::zeroed());
    }

    #[test]
    fn overlapping_overrides_pick_highest_z_index() {
        let mut app = app();
        app.engine.set_layout([
            ("#panel", LayoutRect::new(0.0, 0.0, 500.0, 500.0).with_z_index(1)),
            ("#submit", LayoutRect::new(0.0, 0.0, 100.0, 100.0).with_z_index(10)),
            ("nav", LayoutRect::new(0.0, 0.0, 500.0, 50.0).with_z_index(5)),
        ]);
        assert_eq!(app.engine.hit_test(20.0, 20.0).as_deref(), Some("BUTTON"));
        assert_eq!(app.engine.hit_test(300.0, 20.0).as_deref(), Some("NAV"));
        assert_eq!(app.engine.hit_test(300.0, 300.0).as_deref(), Some("SECTION"));
    }
}

mod http_scenarios {
    use super::*;

    fn expectations() -> Vec<MockExpectation> {
        vec![
            MockExpectation::get("/api/a").respond(MockResponse::text("A")),
            MockExpectation::post("/api/b")
                .with_entity("{\"b\":1}")
                .respond(MockResponse::text("B").with_status(201)),
        ]
    }

    #[test]
    fn requests_in_order_are_called() {
        let mut app = app();
        app.engine.mock_http_requests(TestId(0), expectations());
        let a = app.engine.intercept(&ObservedRequest::new(HttpMethod::Get, "/api/a"));
        let b = app
            .engine
            .intercept(&ObservedRequest::new(HttpMethod::Post, "/api/b").with_body("{\"b\":1}"));
        assert_eq!(a, Interception::Matched(MockResponse::text("A")));
        assert_eq!(b.response().map(|r| r.status), Some(201));
        let results = app.engine.mock_results(TestId(0));
        assert_eq!(results.called, expectations());
        assert!(results.unhandled.is_empty());
    }

    #[test]
    fn requests_out_of_order_are_all_unhandled() {
        let mut app = app();
        app.engine.mock_http_requests(TestId(0), expectations());
        app.engine
            .intercept(&ObservedRequest::new(HttpMethod::Post, "/api/b").with_body("{\"b\":1}"));
        app.engine.intercept(&ObservedRequest::new(HttpMethod::Get, "/api/a"));
        let results = app.engine.mock_results(TestId(0));
        assert!(results.called.is_empty());
        let seen: Vec<_> = results
            .unhandled
            .iter()
            .map(|u| (u.method.as_str(), u.url.as_str()))
            .collect();
        assert_eq!(seen, vec![("POST", "/api/b"), ("GET", "/api/a")]);
        assert!(results.unhandled.iter().all(|u| u.response == MockResponse::new()));
    }

    #[test]
    fn empty_entity_and_custom_methods() {
        let mut app = app();
        app.engine.mock_http_requests(
            TestId(1),
            [
                MockExpectation::put("/api/c").with_entity(""),
                MockExpectation::get("/api/d"),
            ],
        );
        let put = ObservedRequest::new(HttpMethod::Put, "/api/c").with_body("{\"c\":3}");
        assert!(matches!(app.engine.intercept(&put), Interception::Matched(_)));
        let purge = ObservedRequest::new("PURGE".parse().unwrap(), "/api/d");
        assert!(matches!(app.engine.intercept(&purge), Interception::Unhandled(_)));
        let results = app.engine.mock_results(TestId(1));
        assert_eq!(results.called.len(), 1);
        assert_eq!(results.unhandled[0].method.as_str(), "PURGE");
    }

    #[test]
    fn results_survive_as_json() {
        let mut app = app();
        app.engine.mock_http_requests(TestId(2), expectations());
        app.engine.intercept(&ObservedRequest::new(HttpMethod::Get, "/api/a"));
        let value = serde_json::to_value(app.engine.take_mock_results(TestId(2))).unwrap();
        assert_eq!(value["called"][0]["method"], json!("GET"));
        assert_eq!(value["unhandled"], json!([]));
    }
}

mod runtime_scenarios {
    use super::*;

    #[test]
    fn port_and_events() {
        let mut app = app();
        app.engine.ports_mut().open("incoming");
        let sent = app.engine.input_via_port("incoming", &json!({"n": 1}));
        assert_eq!(sent, Outcome::pass("Port: \"incoming\" with payload: {\"n\":1}"));
        let dispatched = app.engine.dispatch_event("keyup", &json!({"key": "a"}), "document");
        assert_eq!(strip_markup(dispatched.message()), "Dispatched event keyup on document");
    }

    #[test]
    fn frame_wait_resolves_after_tick() {
        let mut app = app();
        let wait = app.engine.next_frame();
        app.engine.tick_frame();
        assert_eq!(futures::executor::block_on(wait), Some(1));
    }
}
