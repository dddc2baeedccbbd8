//! # Sensor Host Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-crate flows over the in-memory bus
//!     ├── fixtures.rs   # Simulated sensor plugin
//!     └── flows.rs      # Client -> host -> platform round trips
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p hs-tests
//!
//! # By category
//! cargo test -p hs-tests integration::
//! ```

pub mod integration;
