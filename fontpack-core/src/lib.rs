//! fontpack library exports
//!
//! Detect the fonts a project uses, look them up in a remote catalog and
//! bundle them for production (self-hosted files, CDN links, or both).

pub mod bundle;
pub mod catalog;
pub mod config;
pub mod detect;
pub mod error;
pub mod framework;
pub mod installer;
pub mod paths;

pub use error::{FontpackError, Result};
