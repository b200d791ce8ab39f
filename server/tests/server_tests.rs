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


//! End-to-end tests over real TCP connections.

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use telnetd_server::{
    ConnectionId, ConnectionState, ServerConfig, ServerError, ShellFactory, TelnetServer,
};
use telnetd_session::{PtyDevice, SessionConfig, pty_pair};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing_test::traced_test;

const IAC: u8 = 255;
const WILL: u8 = 251;
const DO: u8 = 253;
const LOGOUT: u8 = 18;
const NAWS: u8 = 31;
const ECHO: u8 = 1;

/// Echoes every keystroke back.
struct EchoShell;

#[async_trait]
impl ShellFactory for EchoShell {
    type Endpoint = PtyDevice;

    async fn open(&self, _: ConnectionId, _: SocketAddr) -> io::Result<PtyDevice> {
        let (device, shell) = pty_pair(1024);
        tokio::spawn(async move {
            let mut buf = [0u8; 256];
            loop {
                let n = shell.read(&mut buf).await;
                if n == 0 {
                    break;
                }
                shell.write_all(&buf[..n]).await;
            }
        });
        Ok(device)
    }
}

/// Prints a line and exits.
struct ByeShell;

#[async_trait]
impl ShellFactory for ByeShell {
    type Endpoint = PtyDevice;

    async fn open(&self, _: ConnectionId, _: SocketAddr) -> io::Result<PtyDevice> {
        let (device, shell) = pty_pair(1024);
        shell.write_all(b"bye\r\n").await;
        shell.close();
        Ok(device)
    }
}

/// Fails to open a shell.
struct BrokenShell;

#[async_trait]
impl ShellFactory for BrokenShell {
    type Endpoint = PtyDevice;

    async fn open(&self, _: ConnectionId, _: SocketAddr) -> io::Result<PtyDevice> {
        Err(io::Error::other("no shell available"))
    }
}

fn config() -> ServerConfig {
    ServerConfig::new("127.0.0.1:0".parse().unwrap())
        .with_keepalive(false)
        .with_shutdown_timeout(Duration::from_millis(500))
}

async fn start<F: ShellFactory>(
    config: ServerConfig,
    factory: F,
) -> (Arc<TelnetServer<F>>, JoinHandle<Result<(), ServerError>>) {
    let server = Arc::new(TelnetServer::bind(config, factory).await.unwrap());
    let accept = server.spawn().unwrap();
    (server, accept)
}

async fn read_until(client: &mut TcpStream, needle: &[u8]) -> Vec<u8> {
    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        let mut buf = [0u8; 512];
        while !contains(&received, needle) {
            let n = client.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before {needle:?} arrived");
            received.extend_from_slice(&buf[..n]);
        }
    })
    .await
    .expect("timed out waiting for data");
    received
}

async fn read_to_close(client: &mut TcpStream) -> Vec<u8> {
    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        let mut buf = [0u8; 512];
        loop {
            match client.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => received.extend_from_slice(&buf[..n]),
            }
        }
    })
    .await
    .expect("timed out waiting for close");
    received
}

async fn wait_for<F: ShellFactory>(server: &TelnetServer<F>, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.connection_count() != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection count never settled");
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[tokio::test]
async fn test_opening_negotiation() {
    let (server, accept) = start(config(), EchoShell).await;
    let mut client = TcpStream::connect(server.bind_address()).await.unwrap();

    let received = read_until(&mut client, &[IAC, DO, NAWS]).await;
    assert!(contains(&received, &[IAC, WILL, ECHO]));

    let connections = server.connections();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].state, ConnectionState::Active);
    assert_eq!(connections[0].peer_addr, client.local_addr().unwrap());

    drop(client);
    wait_for(&server, 0).await;
    server.shutdown().await.unwrap();
    accept.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_keystrokes_reach_the_shell() {
    let (server, accept) = start(config(), EchoShell).await;
    let mut client = TcpStream::connect(server.bind_address()).await.unwrap();

    client.write_all(b"hello\r\n").await.unwrap();
    let received = read_until(&mut client, b"hello\r").await;
    assert!(contains(&received, b"hello"));

    drop(client);
    wait_for(&server, 0).await;
    let snapshot = server.metrics().snapshot();
    assert_eq!(snapshot.network_closes, 1);
    assert!(snapshot.bytes_received >= 7);

    server.shutdown().await.unwrap();
    accept.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shell_exit_closes_connection() {
    let (server, accept) = start(config(), ByeShell).await;
    let mut client = TcpStream::connect(server.bind_address()).await.unwrap();

    let received = read_to_close(&mut client).await;
    assert!(contains(&received, b"bye\r\n"));

    wait_for(&server, 0).await;
    assert_eq!(server.metrics().snapshot().local_closes, 1);

    server.shutdown().await.unwrap();
    accept.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_logout_closes_connection() {
    let (server, accept) = start(config(), EchoShell).await;
    let mut client = TcpStream::connect(server.bind_address()).await.unwrap();

    client.write_all(&[IAC, DO, LOGOUT]).await.unwrap();
    let received = read_to_close(&mut client).await;
    assert!(contains(&received, &[IAC, WILL, LOGOUT]));

    wait_for(&server, 0).await;
    assert_eq!(server.metrics().snapshot().logouts, 1);

    server.shutdown().await.unwrap();
    accept.await.unwrap().unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_connection_limit() {
    let (server, accept) = start(config().with_max_connections(1), EchoShell).await;

    let mut first = TcpStream::connect(server.bind_address()).await.unwrap();
    read_until(&mut first, &[IAC, DO, NAWS]).await;
    wait_for(&server, 1).await;

    let mut second = TcpStream::connect(server.bind_address()).await.unwrap();
    let received = read_to_close(&mut second).await;
    assert!(received.is_empty());
    assert_eq!(server.snapshot().rejected_connections, 1);
    assert_eq!(server.connection_count(), 1);
    assert!(logs_contain("Rejecting connection"));

    drop(first);
    wait_for(&server, 0).await;
    server.shutdown().await.unwrap();
    accept.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_failed_shell_counts_as_error() {
    let (server, accept) = start(config(), BrokenShell).await;
    let mut client = TcpStream::connect(server.bind_address()).await.unwrap();

    read_to_close(&mut client).await;
    wait_for(&server, 0).await;
    let snapshot = server.metrics().snapshot();
    assert_eq!(snapshot.session_errors, 1);
    assert_eq!(snapshot.total_connections, 1);

    server.shutdown().await.unwrap();
    accept.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_aborts_lingering_sessions() {
    let config = config()
        .with_shutdown_timeout(Duration::from_millis(50))
        .with_session(SessionConfig::default().with_poll_interval(Duration::from_millis(5)));
    let (server, accept) = start(config, EchoShell).await;
    let mut client = TcpStream::connect(server.bind_address()).await.unwrap();
    read_until(&mut client, &[IAC, DO, NAWS]).await;

    server.shutdown().await.unwrap();
    accept.await.unwrap().unwrap();
    wait_for(&server, 0).await;

    assert_eq!(server.metrics().snapshot().session_errors, 1);
    assert!(!server.snapshot().running);
    read_to_close(&mut client).await;
}
