//! Distributed File Store Library
//!
//! This library crate defines the core modules of a small three-node file
//! store: a front node that clients connect to, plus two specialist nodes it
//! routes to. It is the foundation for the node binary (`main.rs`) and the
//! interactive client (`bin/client.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`protocol`**: The line-oriented wire protocol — command parsing,
//!   payload framing (declared-length and legacy marker modes) and replies.
//! - **`store`**: The per-node storage layer. Translates the client-visible
//!   `~store` namespace into the node's private root and performs the
//!   store/retrieve/delete/list operations.
//! - **`routing`**: The dispatcher. Classifies each command by file
//!   extension against a static route table and either runs it locally or
//!   forwards it to the owning node over a short-lived connection.
//! - **`fanout`**: The aggregator for cluster-wide commands (`display`),
//!   merging per-node listings and tolerating individual node failure.
//! - **`archive`**: Builds single-extension tar archives by delegating the
//!   packing to the external `tar` utility.

pub mod archive;
pub mod config;
pub mod fanout;
pub mod protocol;
pub mod routing;
pub mod server;
pub mod store;
