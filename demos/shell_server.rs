//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


//! Tiny Line Shell Server
//!
//! Runs a TELNET server whose shell understands three commands:
//! `help`, `mode` (prints the negotiated terminal mode) and `exit`.
//! Character echo and erase are done by the shell whenever the client is
//! not editing lines itself.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=telnetd_session=debug cargo run -p telnetd-server --example shell_server
//! telnet localhost 2323
//! ```

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use telnetd_server::{ConnectionId, ServerConfig, ShellFactory, TelnetServer};
use telnetd_session::{ControlChar, PtyDevice, PtyHandle, SessionConfig, pty_pair};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PROMPT: &[u8] = b"telnetd> ";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::new("127.0.0.1:2323".parse()?)
        .with_max_connections(32)
        .with_session(SessionConfig::default());
    let server = Arc::new(TelnetServer::bind(config, LineShell).await?);
    info!(addr = %server.bind_address(), "Connect with: telnet localhost 2323");
    let accept = server.spawn()?;

    tokio::signal::ctrl_c().await?;
    info!(snapshot = %server.snapshot(), "Shutting down");
    server.shutdown().await?;
    accept.await??;
    Ok(())
}

struct LineShell;

#[async_trait]
impl ShellFactory for LineShell {
    type Endpoint = PtyDevice;

    async fn open(&self, id: ConnectionId, peer_addr: SocketAddr) -> std::io::Result<PtyDevice> {
        let (device, handle) = pty_pair(4096);
        tokio::spawn(run_shell(handle, id, peer_addr));
        Ok(device)
    }
}

async fn run_shell(pty: PtyHandle, id: ConnectionId, peer_addr: SocketAddr) {
    pty.write_all(format!("Welcome {peer_addr}, you are {id}.\r\nType `help`.\r\n").as_bytes())
        .await;
    pty.write_all(PROMPT).await;

    let mut line = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        let n = pty.read(&mut buf).await;
        if n == 0 {
            info!(connection_id = %id, "Client hung up");
            return;
        }
        let mode = pty.mode();
        let erase = mode.control_char(ControlChar::Erase).unwrap_or(0x7f);
        let kill = mode.control_char(ControlChar::Kill).unwrap_or(0x15);
        let interrupt = mode.control_char(ControlChar::Interrupt).unwrap_or(0x03);
        let eof = mode.control_char(ControlChar::EndOfFile).unwrap_or(0x04);

        for &byte in &buf[..n] {
            match byte {
                b'\r' | b'\n' => {
                    if mode.echo {
                        pty.write_all(b"\r\n").await;
                    }
                    let command = String::from_utf8_lossy(&line).trim().to_string();
                    line.clear();
                    if !execute(&pty, &command).await {
                        pty.close();
                        return;
                    }
                    pty.write_all(PROMPT).await;
                }
                0 => {}
                byte if byte == erase || byte == 0x08 => {
                    if line.pop().is_some() && mode.echo {
                        pty.write_all(b"\x08 \x08").await;
                    }
                }
                byte if byte == kill => {
                    if mode.echo {
                        for _ in 0..line.len() {
                            pty.write_all(b"\x08 \x08").await;
                        }
                    }
                    line.clear();
                }
                byte if byte == interrupt => {
                    line.clear();
                    pty.write_all(b"^C\r\n").await;
                    pty.write_all(PROMPT).await;
                }
                byte if byte == eof && line.is_empty() => {
                    pty.write_all(b"logout\r\n").await;
                    pty.close();
                    return;
                }
                byte => {
                    line.push(byte);
                    if mode.echo {
                        pty.write_all(&[byte]).await;
                    }
                }
            }
        }
    }
}

/// Runs one command. Returns false when the shell should exit.
async fn execute(pty: &PtyHandle, command: &str) -> bool {
    match command {
        "" => {}
        "help" => pty.write_all(b"help  mode  exit\r\n").await,
        "mode" => {
            let mode = pty.mode();
            pty.write_all(
                format!(
                    "echo={} line_edit={} trap_signals={} binary_in={} binary_out={} window={}x{}\r\n",
                    mode.echo,
                    mode.line_edit,
                    mode.trap_signals,
                    mode.binary_in,
                    mode.binary_out,
                    mode.window.cols,
                    mode.window.rows
                )
                .as_bytes(),
            )
            .await;
        }
        "exit" | "logout" => {
            pty.write_all(b"bye\r\n").await;
            return false;
        }
        other => {
            pty.write_all(format!("{other}: command not found\r\n").as_bytes())
                .await;
        }
    }
    true
}
