//! Test doubles shared by unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`stub`]: [`StubBrowser`], a scripted [`Browser`](crate::browser::Browser)
//!   that replays per-item attempt steps and counts page lifecycles.

pub mod stub;

pub use stub::{Step, StubBrowser, StubPage};
