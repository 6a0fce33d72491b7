//! End-to-end tests that drive the gistget binary against a scripted winget.

mod common;
mod sync_tests;
