//! Shared test harness modules for the taxi-rank CLI.

use super::*;

mod helpers;
mod summary_steps;
