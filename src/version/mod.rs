//! Version resolution layer
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│  Resolver   │────▶│    Cache    │
//! │ (url, sel,  │     │ (fetch +    │     │ (last known │
//! │  pattern)   │     │  fallback)  │     │    good)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │   Checker   │
//!                     │ (mod update │
//!                     │   notice)   │
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`source`]: Extraction policy and HTTP document fetching
//! - [`resolver`]: Game version resolution with cached fallback
//! - [`cache`]: JSON-file version record with atomic writes
//! - [`checker`]: Read-only add-on update check
//! - [`error`]: Error types for fetch, extraction and cache operations

pub mod cache;
pub mod checker;
pub mod error;
pub mod resolver;
pub mod source;
