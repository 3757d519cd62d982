//! Background jobs
//!
//! The only recurring job is the retry sweep, which re-attempts FAILED
//! notifications that still have attempts left.

pub mod scheduler;

pub use scheduler::RetrySweepScheduler;
