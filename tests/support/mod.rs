//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod fake_source;
pub mod mock_api;
