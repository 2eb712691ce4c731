//! # Wirebox Support
//!
//! Shared utilities for the Wirebox resolution engine.
//!
//! This crate provides:
//! - Text rendering for error messages (chains, short names, suggestions)

pub mod rendering;
