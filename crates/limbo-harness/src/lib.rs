//! Deterministic test support for the Limbo board.
//!
//! [`SimEnv`] implements the core `Environment` trait with a clock that only
//! moves when a test moves it and an RNG seeded by the test. Two runs with
//! the same seed and the same clock steps produce identical thread ids and
//! timestamps, so a failing proptest case replays exactly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_env;

pub use sim_env::SimEnv;
