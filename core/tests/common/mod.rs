// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - Time zone and date time factories (fixtures)
//! - Wall clock assertion helpers

mod assertions;
mod fixtures;

#[allow(unused_imports)]
pub use assertions::{assert_wall_clock, assert_wall_clocks};
#[allow(unused_imports)]
pub use fixtures::{amsterdam, berlin, local, utc, zone};
