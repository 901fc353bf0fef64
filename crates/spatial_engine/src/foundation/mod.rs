//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Axis-aligned boxes
//! - Logging utilities

pub mod geometry;
pub mod logging;
pub mod math;
