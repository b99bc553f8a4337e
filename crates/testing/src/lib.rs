// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Test helpers for the courier workspace.

pub mod wait;

pub use wait::{wait_for, wait_for_condition};
