// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vigil integration tests.
//!
//! Provides a seeded temporary database and a fault-injecting store wrapper
//! for fast, deterministic tests without external services.
//!
//! # Components
//!
//! - [`TestHarness`] - temp SQLite storage with seeding helpers
//! - [`FaultyStore`] - wraps any store and fails, delays or panics on demand

pub mod faults;
pub mod harness;

pub use faults::FaultyStore;
pub use harness::TestHarness;
