// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Flux custom resources and their status conditions.

pub mod condition;
pub mod gitrepository;
pub mod kustomization;

pub use condition::{Condition, HasConditions};
pub use gitrepository::GitRepository;
pub use kustomization::Kustomization;
