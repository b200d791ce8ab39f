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


//! TELNET server
//!
//! The [`TelnetServer`] owns the TCP listener. Every accepted connection gets
//! a [`TcpNetwork`], a local endpoint from the [`ShellFactory`], and a
//! spawned task running one [`Session`] until either side closes.

use crate::{
    ConnectionId, ConnectionInfo, ConnectionState, ServerConfig, ServerError, ServerMetrics,
    ServerResult, ServerSnapshot, TcpNetwork,
};
use async_trait::async_trait;
use dashmap::DashMap;
use metrics::{counter, gauge};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use telnetd_session::{LocalEndpoint, Session, SessionConfig};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

/// Opens the local endpoint (a shell behind a pseudo-terminal) for a new
/// connection.
#[async_trait]
pub trait ShellFactory: Send + Sync + 'static {
    /// The endpoint handed to the session
    type Endpoint: LocalEndpoint + 'static;

    /// Called once per accepted connection, before the session starts.
    async fn open(&self, id: ConnectionId, peer_addr: SocketAddr) -> io::Result<Self::Endpoint>;
}

/// Registry entry for a live connection
struct Connection {
    peer_addr: SocketAddr,
    created_at: Instant,
    state: Arc<AtomicU8>,
    abort: Option<AbortHandle>,
}

impl Connection {
    fn info(&self, id: ConnectionId) -> ConnectionInfo {
        ConnectionInfo {
            id,
            state: ConnectionState::from_u8(self.state.load(Ordering::Acquire)),
            peer_addr: self.peer_addr,
            created_at: self.created_at,
        }
    }
}

/// State shared between the accept loop and the session tasks
struct Shared<F> {
    factory: F,
    session_config: Arc<SessionConfig>,
    connections: DashMap<ConnectionId, Connection>,
    metrics: ServerMetrics,
}

/// Removes a connection from the registry when its task ends, aborted or not.
struct Registration<F: ShellFactory> {
    shared: Arc<Shared<F>>,
    id: ConnectionId,
    started: Instant,
    recorded: bool,
}

impl<F: ShellFactory> Drop for Registration<F> {
    fn drop(&mut self) {
        if !self.recorded {
            self.shared.metrics.session_failed(self.started.elapsed());
        }
        if let Some((_, connection)) = self.shared.connections.remove(&self.id) {
            connection
                .state
                .store(ConnectionState::Closed.as_u8(), Ordering::Release);
        }
        gauge!("telnetd.connections.active").decrement(1.0);
    }
}

/// TELNET server
///
/// # Example
///
/// ```no_run
/// use async_trait::async_trait;
/// use std::net::SocketAddr;
/// use std::sync::Arc;
/// use telnetd_server::{ConnectionId, ServerConfig, ShellFactory, TelnetServer};
/// use telnetd_session::{PtyDevice, pty_pair};
///
/// struct Echo;
///
/// #[async_trait]
/// impl ShellFactory for Echo {
///     type Endpoint = PtyDevice;
///
///     async fn open(&self, _: ConnectionId, _: SocketAddr) -> std::io::Result<PtyDevice> {
///         let (device, shell) = pty_pair(4096);
///         tokio::spawn(async move {
///             let mut buf = [0u8; 256];
///             loop {
///                 let n = shell.read(&mut buf).await;
///                 if n == 0 {
///                     break;
///                 }
///                 shell.write_all(&buf[..n]).await;
///             }
///         });
///         Ok(device)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig::new("127.0.0.1:2323".parse()?);
///     let server = Arc::new(TelnetServer::bind(config, Echo).await?);
///     let accept = server.spawn()?;
///     tokio::signal::ctrl_c().await?;
///     server.shutdown().await?;
///     accept.await??;
///     Ok(())
/// }
/// ```
pub struct TelnetServer<F: ShellFactory> {
    config: ServerConfig,
    listener: TcpListener,
    bind_address: SocketAddr,
    shared: Arc<Shared<F>>,
    next_id: AtomicU64,
    running: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    started_at: Instant,
}

impl<F: ShellFactory> TelnetServer<F> {
    /// Binds the listener. Connections are accepted once [`TelnetServer::serve`]
    /// or [`TelnetServer::spawn`] runs.
    pub async fn bind(config: ServerConfig, factory: F) -> ServerResult<Self> {
        config.validate()?;
        let listener = TcpListener::bind(config.bind_address).await?;
        let bind_address = listener.local_addr()?;
        info!(addr = %bind_address, "Telnet server bound");
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            shared: Arc::new(Shared {
                factory,
                session_config: Arc::clone(&config.session),
                connections: DashMap::new(),
                metrics: ServerMetrics::new(),
            }),
            config,
            listener,
            bind_address,
            next_id: AtomicU64::new(1),
            running: AtomicBool::new(false),
            shutdown_tx,
            started_at: Instant::now(),
        })
    }

    /// Runs the accept loop until [`TelnetServer::shutdown`].
    pub async fn serve(&self) -> ServerResult<()> {
        self.mark_running()?;
        self.accept_loop().await;
        Ok(())
    }

    /// Runs the accept loop on a new task.
    ///
    /// The server is running when this returns, so `shutdown` may be
    /// called right away.
    pub fn spawn(self: &Arc<Self>) -> ServerResult<JoinHandle<ServerResult<()>>> {
        self.mark_running()?;
        let server = Arc::clone(self);
        Ok(tokio::spawn(async move {
            server.accept_loop().await;
            Ok(())
        }))
    }

    fn mark_running(&self) -> ServerResult<()> {
        if *self.shutdown_tx.borrow() {
            return Err(ServerError::NotRunning);
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyRunning);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(addr = %self.bind_address))]
    async fn accept_loop(&self) {
        let mut shutdown = self.shutdown_tx.subscribe();
        info!("Accepting connections");
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = shutdown.changed() => continue,
            };
            match accepted {
                Ok((stream, peer_addr)) => self.admit(stream, peer_addr),
                Err(error) => {
                    error!(error = %error, "Failed to accept connection");
                    self.shared.metrics.accept_error();
                    // Back off so a persistent failure (EMFILE) does not spin
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
        info!("Accept loop terminated");
    }

    fn admit(&self, stream: TcpStream, peer_addr: SocketAddr) {
        if self.shared.connections.len() >= self.config.max_connections {
            let error = ServerError::ConnectionLimit(self.config.max_connections);
            warn!(peer = %peer_addr, error = %error, "Rejecting connection");
            self.shared.metrics.connection_rejected();
            counter!("telnetd.connections.rejected").increment(1);
            return;
        }

        let network = match TcpNetwork::new(stream) {
            Ok(network) => network,
            Err(error) => {
                warn!(peer = %peer_addr, error = %error, "Failed to configure socket");
                self.shared.metrics.accept_error();
                return;
            }
        };
        if let Err(error) = network.set_keepalive(self.config.keepalive) {
            debug!(peer = %peer_addr, error = %error, "Keepalive not applied");
        }

        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let state = Arc::new(AtomicU8::new(ConnectionState::Connecting.as_u8()));
        self.shared.connections.insert(
            id,
            Connection {
                peer_addr,
                created_at: Instant::now(),
                state: Arc::clone(&state),
                abort: None,
            },
        );
        self.shared.metrics.connection_opened();
        counter!("telnetd.connections.total").increment(1);
        gauge!("telnetd.connections.active").increment(1.0);
        info!(connection_id = %id, peer = %peer_addr, "Connection established");

        let registration = Registration {
            shared: Arc::clone(&self.shared),
            id,
            started: Instant::now(),
            recorded: false,
        };
        let span = info_span!("connection", connection_id = %id, peer = %peer_addr);
        let handle = tokio::spawn(run_connection(registration, network, state).instrument(span));
        if let Some(mut entry) = self.shared.connections.get_mut(&id) {
            entry.abort = Some(handle.abort_handle());
        }
    }

    /// Stops accepting and waits up to the shutdown timeout for sessions to
    /// end. Sessions still running after that are aborted.
    pub async fn shutdown(&self) -> ServerResult<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(ServerError::NotRunning);
        }
        info!(
            connections = self.shared.connections.len(),
            "Shutting down Telnet server"
        );
        self.shutdown_tx.send_replace(true);
        for entry in self.shared.connections.iter() {
            entry
                .state
                .store(ConnectionState::Closing.as_u8(), Ordering::Release);
        }

        let drained = tokio::time::timeout(self.config.shutdown_timeout, async {
            while !self.shared.connections.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        if drained.is_err() {
            let stragglers: Vec<AbortHandle> = self
                .shared
                .connections
                .iter()
                .filter_map(|entry| entry.abort.clone())
                .collect();
            warn!(count = stragglers.len(), "Aborting sessions after shutdown timeout");
            for handle in stragglers {
                handle.abort();
            }
        }

        info!("Telnet server shutdown complete");
        Ok(())
    }

    /// Check if the server is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the address the listener is bound to
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the number of live connections
    pub fn connection_count(&self) -> usize {
        self.shared.connections.len()
    }

    /// Look up a live connection
    pub fn connection(&self, id: ConnectionId) -> Option<ConnectionInfo> {
        self.shared.connections.get(&id).map(|entry| entry.info(id))
    }

    /// List the live connections, oldest first
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        let mut list: Vec<_> = self
            .shared
            .connections
            .iter()
            .map(|entry| entry.info(*entry.key()))
            .collect();
        list.sort_by_key(|info| info.id);
        list
    }

    /// Get the server metrics
    pub fn metrics(&self) -> &ServerMetrics {
        &self.shared.metrics
    }

    /// Get a snapshot of the server state
    pub fn snapshot(&self) -> ServerSnapshot {
        ServerSnapshot {
            active_connections: self.shared.connections.len(),
            total_connections: self.shared.metrics.total_connections(),
            rejected_connections: self.shared.metrics.rejected_connections(),
            bind_address: self.bind_address,
            running: self.is_running(),
            uptime: self.started_at.elapsed(),
        }
    }
}

async fn run_connection<F: ShellFactory>(
    mut registration: Registration<F>,
    network: TcpNetwork,
    state: Arc<AtomicU8>,
) {
    let shared = Arc::clone(&registration.shared);
    let id = registration.id;
    let result = async {
        let local = shared.factory.open(id, network.peer_addr()).await?;
        state.store(ConnectionState::Active.as_u8(), Ordering::Release);
        let mut session = Session::new(Arc::clone(&shared.session_config), network, local)
            .with_label(id.to_string());
        Ok::<_, ServerError>(session.run().await?)
    }
    .await;

    match result {
        Ok(summary) => {
            info!(
                reason = %summary.reason,
                bytes_received = summary.stats.bytes_received,
                bytes_sent = summary.stats.bytes_sent,
                "Connection closed"
            );
            shared.metrics.session_finished(&summary);
            registration.recorded = true;
        }
        Err(error) => warn!(error = %error, "Connection failed"),
    }
}

impl<F: ShellFactory> std::fmt::Debug for TelnetServer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetServer")
            .field("bind_address", &self.bind_address)
            .field("running", &self.is_running())
            .field("connection_count", &self.connection_count())
            .field("uptime", &self.started_at.elapsed())
            .finish()
    }
}

impl<F: ShellFactory> Drop for TelnetServer<F> {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            warn!("TelnetServer dropped while still running");
            self.shutdown_tx.send_replace(true);
        }
    }
}
