//! Fan-out Module
//!
//! Answers the commands that are not owned by a single role. A `display`
//! request is satisfied by querying the local handler plus every remote
//! node and merging the contributions in a fixed role order; one node being
//! down degrades its contribution to empty instead of failing the whole
//! aggregate.

pub mod aggregator;

#[cfg(test)]
mod tests;
