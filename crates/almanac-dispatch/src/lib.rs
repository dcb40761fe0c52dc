//! Hook pipeline and wire responses for almanac view requests.
//!
//! `almanac-dispatch` holds the pieces of request handling that are independent
//! of how views are chosen or rendered:
//!
//! - **Hooks**: filters and wrappers at fixed pipeline points ([`Hooks`])
//! - **Responses**: the terminal body of an ajax view request ([`Response`])
//! - **Serialization**: compact JSON for the wire ([`to_json`])
//!
//! # Usage
//!
//! ```rust
//! use almanac_dispatch::{HookContext, Hooks};
//!
//! let hooks = Hooks::new()
//!     .before_html(|_| Ok("<div class=\"tribe-events\">".into()))
//!     .after_html(|_| Ok("</div>".into()));
//!
//! let html = hooks.run_wrap(&HookContext::for_view("list"), "<ul></ul>").unwrap();
//! assert_eq!(html, "<div class=\"tribe-events\"><ul></ul></div>");
//! ```

mod hooks;
mod response;
mod serialize;

pub use hooks::{
    HookContext, HookError, HookPhase, Hooks, HtmlFn, NotifyFn, RawFn, TemplateFn, ValueFn,
};

pub use response::{Response, JSON_CONTENT_TYPE};

pub use serialize::{to_json, to_value, SerializeError};
