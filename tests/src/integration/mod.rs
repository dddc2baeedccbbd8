//! # Integration Tests
//!
//! Drive a full host (bus adapter, tasking service, plugins) over the
//! in-memory bus with a mock tasking platform on the other side.

pub mod fixtures;
mod flows;
