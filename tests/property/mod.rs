//! Property-based tests for sync planning

mod planner;
