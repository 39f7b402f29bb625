//! # leetrecall-algo - memory-state model for coding-problem review
//!
//! Pure algorithms, no I/O:
//!
//! - **FSRS dynamics** - stability/difficulty/retrievability update rules
//! - **Phase machine** - New / Learning / Review / Relearning transitions
//!   with same-day learning steps
//!
//! The scheduler is a pure function of (current state, grade, now); callers
//! persist the result.
//!
//! ## Module structure
//!
//! - [`fsrs`] - forgetting-curve math and the weight vector
//! - [`scheduler`] - [`Scheduler::compute_next`], the single entry point
//! - [`types`] - [`Grade`], [`CardPhase`], [`MemoryState`]

pub mod fsrs;
pub mod scheduler;
pub mod types;

pub use fsrs::{retrievability, FsrsParams};
pub use scheduler::Scheduler;
pub use types::{CardPhase, Grade, MemoryState};
