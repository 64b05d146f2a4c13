//! Library half of the `weather-server` binary.
//!
//! Split out so integration tests can assemble the router and state
//! directly instead of spawning a process.

pub mod cli;
pub mod middleware;
pub mod routes;
pub mod state;
