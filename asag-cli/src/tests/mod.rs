//! Shared test harness modules for the CLI.

use super::*;

mod helpers;
mod track_unit;
