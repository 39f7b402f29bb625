//! # leetrecall-core
//!
//! Scheduling core for a coding-problem spaced-repetition tracker. UI
//! surfaces talk to this crate through the tagged request/response contract
//! in [`dispatch`]; persistence and time are injected collaborators
//! ([`storage::KvStore`], [`clock::Clock`]).
//!
//! The memory model itself lives in `leetrecall-algo`; this crate drives it,
//! persists its output, counts daily reviews, and builds the bounded daily
//! queue.

pub mod cards;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod interleave;
pub mod logging;
pub mod queue;
pub mod settings;
pub mod state;
pub mod stats;
pub mod storage;

pub use cards::Card;
pub use dispatch::{handle, Request, Response};
pub use error::{CoreError, CoreResult};
pub use state::App;
pub use stats::DailyStats;
