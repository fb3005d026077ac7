//! Notification core — pure logic, zero I/O.
//!
//! The [`Notifier`](notifier::Notifier) formats messages and interprets
//! response codes; every network or logging side effect flows through
//! the **port traits** defined in [`ports`], keeping this layer fully
//! testable without a transport.

pub mod notifier;
pub mod ports;
