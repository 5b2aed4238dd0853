// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod install;
pub mod kubernetes;
pub mod process;
pub mod provision;
pub mod types;
pub mod verify;

#[cfg(test)]
pub mod test_utils;
