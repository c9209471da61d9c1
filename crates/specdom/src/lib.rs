//! Specdom: assertion and interaction runtime for DOM specs.
//!
//! A scenario runner drives an application rendered into a document and
//! checks it step by step. Every step comes back as a three-valued
//! [`Outcome`] (pass, fail or error) with a self-describing message, and
//! nothing the document throws ever escapes as a native fault.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        SpecEngine<D: Dom>                     │
//! ├───────────────────────────────────────────────────────────────┤
//! │  assertions ─┐                    ┌─ LayoutOverrides/Geometry │
//! │  interaction ┼─► resolver ─► Dom ◄┤                           │
//! │  visibility ─┘                    └─ native layout            │
//! │                                                               │
//! │  MockStore · InvocationCounter · FrameScheduler · ReportSink  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The live document is reached through the [`Dom`] trait. [`MemoryDom`]
//! implements it in memory for headless runs.
//!
//! ```
//! use specdom::{EngineConfig, MemoryDom, SpecEngine};
//!
//! let mut dom = MemoryDom::new();
//! let body = dom.body();
//! let input = dom.append_element(body, "input");
//! dom.set_attribute(input, "id", "name");
//!
//! let mut engine = SpecEngine::new(dom, EngineConfig::default());
//! assert!(engine.set_value_and_dispatch("abc", "#name", "input").is_pass());
//! assert!(engine.value_equals("abc", "#name").is_pass());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Element and document assertions
pub mod assertions;

/// Clicks, form values and synthetic events
pub mod interaction;

mod config;
mod counter;
mod dom;
mod engine;
mod event;
mod frame;
mod http_mock;
mod layout;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
mod memory_dom;
mod outcome;
mod ports;
mod report;
mod resolver;
mod result;
mod selector;
mod test_id;
mod visibility;

pub use config::{ColorChoice, EngineConfig};
pub use counter::InvocationCounter;
pub use dom::{ClientRect, Dom, LayoutRect};
pub use engine::SpecEngine;
pub use event::{DispatchTarget, EventKind, EventTarget, SyntheticEvent};
pub use frame::{FrameScheduler, NextFrame};
pub use http_mock::{
    HttpMethod, Interception, MockExpectation, MockResponse, MockResults, MockStore,
    ObservedRequest, UnhandledRequest,
};
pub use layout::{Geometry, LayoutOverride, LayoutOverrides};
pub use memory_dom::{MemoryDom, NodeId, RecordedEvent, RecordedTarget};
pub use outcome::{ansi_to_html, bold, bold_string, strip_markup, Outcome, BOLD_END, BOLD_START};
pub use ports::{input_via_port, AppPorts, PortRegistry};
pub use report::ReportSink;
pub use resolver::{not_found, resolve, with_element, with_element_mut};
pub use result::{SpecdomError, SpecdomResult};
pub use selector::Selector;
pub use test_id::{current_test_id, TestId};
pub use visibility::{check_visibility, hidden_by, HiddenBy};
