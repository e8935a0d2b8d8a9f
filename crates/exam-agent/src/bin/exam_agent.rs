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

//! Exam Agent - HTTP front-end for CrownLabs exam instances
//!
//! Serves `/healthz`, `/instance/<name>` and `/template`, backed by the
//! `Instance` and `Template` resources of the configured namespace.

use anyhow::{Context, Result};
use clap::Parser;
use exam_agent::{run_server, telemetry, KubeStore, Options, ServerState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::parse();
    telemetry::init_tracing(options.log_format);

    info!("Starting exam agent v{}", env!("CARGO_PKG_VERSION"));

    options.validate().context("invalid configuration")?;
    let addr = options.socket_addr()?;

    let store = KubeStore::try_default()
        .await
        .context("failed to build Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    let state = Arc::new(ServerState::new(
        Arc::new(store),
        options.templates_ns.clone(),
        options.allow_list(),
    ));

    info!(
        "Serving templates and instances of namespace {}",
        options.templates_ns
    );
    run_server(state, addr).await
}
