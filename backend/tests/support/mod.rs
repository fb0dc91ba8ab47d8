//! Shared world and steps for the behavioural suites.

pub mod campus_world;
pub mod steps;
