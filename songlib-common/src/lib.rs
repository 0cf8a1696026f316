//! # Songlib Common Library
//!
//! Shared code for the song catalog service:
//! - Song models and the SQLite-backed song store
//! - Schema migrations
//! - Configuration resolution
//! - Listing pagination
//! - Verse segmentation of lyric text

pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod verse;

pub use error::{Error, Result};
