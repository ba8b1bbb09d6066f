//! HTTP plumbing for the tool-call emulation gateway.
//!
//! Two axum servers run side by side: the emulation server rewrites tool
//! definitions into the prompt and mines the backend's reply for tool
//! calls, while the passthrough server forwards requests verbatim for
//! models with native tool support.

pub mod api;
pub mod config;
pub mod egress;
pub mod logging;
pub mod shutdown;
