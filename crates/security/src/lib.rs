//! Security module for Anvil — workspace containment and script screening.
//!
//! Provides:
//! - **Path sandbox**: every filesystem-touching capability resolves its
//!   path argument through [`resolve`] / [`resolve_contained`] first
//! - **Script screening**: a substring denylist applied before a script is
//!   handed to an interpreter. This is a weak heuristic, not a boundary.

pub mod path;
pub mod script;

pub use path::{PathEscapeError, check_segments, resolve, resolve_contained};
pub use script::{DENIED_SCRIPT_CALLS, screen_script};
