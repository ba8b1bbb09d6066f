//! Protocol-adaptation core for the tool-call emulation gateway.
//!
//! This crate contains everything that does not touch the network:
//! - [`types`]: OpenAI-compatible chat completion request types
//! - [`tool_parser`]: the dialect parser library and extraction pipeline
//! - [`prompt`]: embedding of tool definitions into the system prompt
//! - [`patch`]: rewriting of upstream responses into OpenAI `tool_calls` shape
//! - [`xml`]: XML escaping and parameter type inference helpers
//!
//! All entry points are pure functions over request-scoped data; the only
//! process-wide state is the compiled parser registry.

pub mod patch;
pub mod prompt;
pub mod tool_parser;
pub mod types;
pub mod xml;
