//! Local Storage Module
//!
//! The file operations every node exposes, plus the namespace translation
//! that maps client-visible paths onto a node's private storage root.
//!
//! ## Core Concepts
//! - **Namespace**: Clients only ever see paths rooted at `~store`; each node
//!   rewrites that root into its own configured storage directory.
//! - **Containment**: Translation rejects any path that would escape the
//!   storage root before any filesystem I/O happens.
//! - **Handler Contract**: `store`, `retrieve`, `delete` and `list_matching`
//!   behave identically on every role; only the owned extension differs.

pub mod handler;
pub mod namespace;

#[cfg(test)]
mod tests;
