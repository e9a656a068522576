//! Generic data structures and graph algorithms: the ranked dag of the
//! layered layout, priority queues, integer pair sets and the algorithms that
//! run on edge-list graphs.

pub mod dag;
pub mod graph;
pub mod int_pair;
pub mod priority_queue;
