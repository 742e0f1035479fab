// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod origin;
pub mod protocol;
pub mod sse_legacy;
pub mod shutdown;
pub mod stdio;
pub mod streamable_http;
