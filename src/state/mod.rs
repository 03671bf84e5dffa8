//! Run-scoped shared state
//!
//! # Components
//!
//! - `VisitedSet`: the claim gate that lets each detail address be processed once
//! - `HomeIdCounter`: hands out unique, monotonic `home_id` values
//! - `RunPhase`: the phase a crawl run is in, with its allowed transitions
//!
//! The visited set and the id counter are the only values mutated by more than
//! one worker at a time. Both are cheap handles over shared state, created once
//! per run and passed explicitly to the workers that need them.

mod ids;
mod run_phase;
mod visited;

pub use ids::HomeIdCounter;
pub use run_phase::RunPhase;
pub use visited::VisitedSet;
