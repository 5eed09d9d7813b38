//! Readiness reactor and the continuation types chained through it.
//!
//! A [`Pollable`] is one pending non-blocking operation. When it completes it
//! hands its result to a [`Callback`], which may return the next pollable in
//! the chain. The [`Reactor`] owns every pending pollable and multiplexes them
//! with `poll(2)` on a single thread.

pub mod event_loop;
pub mod pollable;

pub use event_loop::{Reactor, ReactorConfig};
pub use pollable::{Attempt, Callback, Next, PollError, Pollable, finish};
