//! # Civitas Client Test Suite
//!
//! Cross-crate scenarios that exercise the wired component graph the same way
//! the `civitas` binary and the web client do.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # World (shared clock + LocalReplica), Client
//!     ├── session_flows.rs   # login, reload, expiry, provider switch
//!     ├── civic_flows.rs     # projects, polls, votes, rewards across users
//!     ├── gateway_flows.rs   # single-flight construction, eviction
//!     └── transport_flows.rs # HTTP transport failure classification
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cv-tests
//! cargo test -p cv-tests integration::session_flows
//! ```

pub mod integration;
