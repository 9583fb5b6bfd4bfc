//! Core reusable components for scoring rounds.
//!
//! This module contains components that are agnostic to the pairing and
//! reporting mode and are reused by every scoring stream.

pub mod alignment;
pub mod compute;
pub mod io;
