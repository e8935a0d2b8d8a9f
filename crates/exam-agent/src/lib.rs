/*
 * 5D Labs Agent Platform - Exam Agent
 * Copyright (C) 2025 5D Labs
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! Exam agent library
//!
//! HTTP front-end translating exam requests into CrownLabs `Instance` and
//! `Template` resources: instance lookup with redirect or starting-up page,
//! instance upsert and deletion guarded by a source-address allowlist, and
//! template listing.

pub mod auth;
pub mod config;
pub mod crds;
pub mod error;
pub mod handlers;
pub mod server;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use auth::AllowList;
pub use config::{LogFormat, Options};
pub use crds::{Instance, InstanceSpec, InstanceStatus, Template, TemplateSpec};
pub use error::{ApiError, ConfigError, StoreError};
pub use server::{build_router, run_server, serve, ServerState};
pub use store::{KubeStore, MemoryStore, OperationResult, ResourceStore};
