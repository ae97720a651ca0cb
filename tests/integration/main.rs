//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one part of the link
//! stack against scripted or simulated boards.  No serial hardware is
//! required and no test sleeps: all delays go to a fake clock.

mod climate_tests;
mod config_tests;
mod mock_link;
mod poller_tests;
mod shading_tests;
