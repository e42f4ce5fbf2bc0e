//! Session module for persisting and resuming scan state.
//!
//! A scan's state lives in two JSON documents that are rewritten in full
//! after every hashed file:
//!
//! * **duplicates**: digest to an array of two or more paths
//! * **uniques**: digest to a single path string
//!
//! Both are written with sorted keys and two-space indentation, so writing
//! the same logical state twice produces identical bytes. A crash loses at
//! most the hashes that were still in flight.
//!
//! # Architecture
//!
//! * [`data`]: the resume state and the name-based skip set.
//! * [`io`]: loading both documents for a restart and writing them back.

pub mod data;
pub mod io;

pub use data::{ResumeState, SkipSet};
pub use io::{load_state, StateError, StateWriter};
