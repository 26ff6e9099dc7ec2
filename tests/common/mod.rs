//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod fake_registry;
pub mod images;
