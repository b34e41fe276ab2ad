//! Host-side panic boundary around a render computation.
//!
//! The core never swallows computation errors: a panicking node unwinds to
//! the host after tracker cleanup. This is the host surface that turns such
//! an unwind into a fallback component instead of a crash.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::component::Component;

pub struct RenderPanic {
    pub message: String,
}

/// Run `content`; on panic, render `fallback` with the extracted message.
pub fn catch_render(
    fallback: impl Fn(RenderPanic) -> Component,
    content: impl FnOnce() -> Component,
) -> Component {
    match catch_unwind(AssertUnwindSafe(content)) {
        Ok(component) => component,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else {
                "unknown panic".to_string()
            };
            log::warn!("render computation panicked: {message}");
            fallback(RenderPanic { message })
        }
    }
}
