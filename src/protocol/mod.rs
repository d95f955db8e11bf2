//! Wire Protocol Module
//!
//! Implements the line-oriented command protocol spoken between the client,
//! the front node and the two specialist nodes.
//!
//! ## Core Concepts
//! - **Commands**: One ASCII line per operation (`ufile`, `dfile`, `rmfile`, `dtar`, `display`).
//! - **Payload Framing**: Declared-length (`LEN <n>`) as the canonical mode; a legacy
//!   marker-delimited mode (`RAW` + sentinel) for streams whose length is unknown up front.
//! - **Replies**: Status lines (`OK:` / `ERROR:`) or length-framed bodies (`DATA` / `LIST`).
//!   Errors are distinguished from data solely by the `ERROR:` prefix.

pub mod codec;
pub mod types;
