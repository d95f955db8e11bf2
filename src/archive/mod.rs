//! Archive Module
//!
//! Builds a single tar archive of every file of one extension class under a
//! node's storage root. The packing itself is delegated to the external
//! `tar` utility; this module only finds the matching files, runs the tool
//! and hands the resulting byte stream back for normal payload framing.

pub mod builder;
