// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # S2T Accelerator Gateway Core
//!
//! Tool dispatch, session lifecycle, and transport bindings for the S2T
//! accelerator gateway. Every operation's substantive logic runs on the
//! remote accelerator service; this crate validates input, forwards
//! normalized requests, and reformats results.
//!
//! # Architecture
//!
//! - **domain**: tool descriptors, input schemas, session lifecycle
//! - **application**: registry, dispatcher, per-operation handlers
//! - **infrastructure**: accelerator HTTP client, configuration
//! - **presentation**: stdio, streamable HTTP, and legacy SSE bindings

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::tool::{CallResult, ToolDescriptor, ToolError};
