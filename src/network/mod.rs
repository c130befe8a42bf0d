//! Network reachability
//!
//! - [`probe`]: DNS and HTTP heuristics combined with local interface evidence

pub mod probe;

pub use probe::{ConnectivityCheck, ConnectivityProbe, Reachability};
