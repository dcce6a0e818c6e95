//! Process-level helpers shared by the fleet binaries and tests.

pub mod env;
pub mod logging;
