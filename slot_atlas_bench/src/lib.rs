// Copyright 2025 the Slot Atlas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for the slot atlas allocator.

#![allow(missing_docs, reason = "Not needed for benchmarks")]

pub mod allocator;

pub const SEED: [u8; 32] = [0; 32];
