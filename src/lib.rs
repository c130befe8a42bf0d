//! Keeps a server's core config in step with the live game version.
//!
//! - [`network`]: connectivity probe
//! - [`version`]: remote version resolution, cache and add-on update check
//! - [`patch`]: core config injection
//! - [`workflow`]: one ordered synchronization run
//! - [`config`], [`logging`], [`runtime`]: ambient configuration, tracing and runtime setup

pub mod config;
pub mod logging;
pub mod network;
pub mod patch;
pub mod runtime;
pub mod version;
pub mod workflow;
