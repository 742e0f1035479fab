// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Point-to-point stdio transport.
//!
//! Newline-delimited JSON-RPC on stdin/stdout, one implicit session per
//! process lifetime, so no session registry is needed. Logging goes to
//! stderr; stdout is reserved for protocol messages.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};

use crate::application::dispatcher::Dispatcher;
use crate::presentation::protocol::{dispatch_request, error_codes, error_response, parse_request};

pub struct StdioTransport {
    dispatcher: Dispatcher,
}

impl StdioTransport {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run the read-dispatch-write loop until stdin closes.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        tracing::info!("stdio transport started");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let payload: Value = match serde_json::from_str(line) {
                Ok(value) => value,
                Err(err) => {
                    let response = error_response(
                        Value::Null,
                        error_codes::PARSE_ERROR,
                        format!("Parse error: {}", err),
                    );
                    write_line(&mut stdout, &response).await?;
                    continue;
                }
            };

            let request = match parse_request(&payload) {
                Ok(request) => request,
                Err(response) => {
                    write_line(&mut stdout, &response).await?;
                    continue;
                }
            };

            if let Some(response) = dispatch_request(&self.dispatcher, &request).await {
                write_line(&mut stdout, &response).await?;
            }
        }

        tracing::info!("stdio transport stopped");
        Ok(())
    }
}

async fn write_line(stdout: &mut Stdout, response: &Value) -> anyhow::Result<()> {
    let mut bytes = serde_json::to_vec(response)?;
    bytes.push(b'\n');
    stdout.write_all(&bytes).await?;
    stdout.flush().await?;
    Ok(())
}
