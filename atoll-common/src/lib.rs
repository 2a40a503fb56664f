//! # Atoll Common Library
//!
//! Shared code for the atoll service crates:
//! - Workspace-wide error type
//! - Scene export wire types (the viewer contract)
//! - Single-subscriber push channel to the viewer

pub mod error;
pub mod push;
pub mod scene;

pub use error::{Error, Result};
pub use push::ViewerLink;
