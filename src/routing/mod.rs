//! Routing Module
//!
//! Decides which node a command belongs to and executes it there.
//!
//! ## Core Concepts
//! - **Static Route Table**: A total function from file extension to owning
//!   role (`.c` front, `.txt` text, `.pdf` pdf); everything else is rejected
//!   before any handler runs.
//! - **Dispatch**: Local commands run the node's own handler; foreign ones
//!   are forwarded over a short-lived connection and the single response is
//!   relayed verbatim, so the client keeps seeing one unified store.
//! - **Deadlines**: Every forwarded call carries a bounded deadline; expiry
//!   counts as that node being unavailable.

pub mod dispatcher;
pub mod table;
