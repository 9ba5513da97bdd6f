// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! Every trait uses `#[async_trait]` so implementations can be held as
//! `Arc<dyn Trait>` and swapped for test doubles.

pub mod kv;
pub mod model;

pub use kv::{KvStore, KvStoreExt, PutOptions};
pub use model::ModelAdapter;
