//! # Organize Module
//!
//! Moves media files from an input tree into a date-structured output tree.
//!
//! ## Per-file Flow
//! 1. Skip the file if it is no longer a regular file
//! 2. Leave it in place if identical content already exists in the output
//! 3. Resolve its capture timestamp
//! 4. Allocate a free destination and move it there without overwriting
//!
//! Files are handled one at a time in path order. A failure affects only the
//! file it happened to.

mod executor;
mod organizer;
mod planner;
mod types;

pub use executor::MoveExecutor;
pub use organizer::{Organizer, MAX_MOVE_ATTEMPTS};
pub use planner::{Decision, OrganizePlanner};
pub use types::*;
