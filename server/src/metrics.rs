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


//! Lock-free metrics for the TELNET server

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use telnetd_session::{CloseReason, SessionSummary};

/// Lock-free server metrics
///
/// All counters are atomics and can be updated from every session task
/// without locks. Use [`ServerMetrics::snapshot`] for a point-in-time view.
#[derive(Debug)]
pub struct ServerMetrics {
    // Connection counts
    total_connections: AtomicU64,
    active_connections: AtomicU64,
    rejected_connections: AtomicU64,

    // Throughput
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,

    // Close reasons
    network_closes: AtomicU64,
    local_closes: AtomicU64,
    logouts: AtomicU64,
    session_errors: AtomicU64,
    accept_errors: AtomicU64,

    // Timing (stored as nanoseconds)
    total_connection_duration_ns: AtomicU64,

    started_at: Instant,
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_connections: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            rejected_connections: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            network_closes: AtomicU64::new(0),
            local_closes: AtomicU64::new(0),
            logouts: AtomicU64::new(0),
            session_errors: AtomicU64::new(0),
            accept_errors: AtomicU64::new(0),
            total_connection_duration_ns: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Record a new connection being accepted
    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection turned away at the connection limit
    pub fn connection_rejected(&self) {
        self.rejected_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed `accept`
    pub fn accept_error(&self) {
        self.accept_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session that ended normally
    pub fn session_finished(&self, summary: &SessionSummary) {
        let reason = match summary.reason {
            CloseReason::NetworkClosed => &self.network_closes,
            CloseReason::LocalClosed => &self.local_closes,
            CloseReason::Logout => &self.logouts,
        };
        reason.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent
            .fetch_add(summary.stats.bytes_sent, Ordering::Relaxed);
        self.bytes_received
            .fetch_add(summary.stats.bytes_received, Ordering::Relaxed);
        self.connection_closed(summary.duration);
    }

    /// Record a session that ended with an error
    pub fn session_failed(&self, duration: Duration) {
        self.session_errors.fetch_add(1, Ordering::Relaxed);
        self.connection_closed(duration);
    }

    fn connection_closed(&self, duration: Duration) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
        self.total_connection_duration_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Get the current number of active connections
    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Get the total number of connections since server start
    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    /// Get the number of connections rejected at the limit
    pub fn rejected_connections(&self) -> u64 {
        self.rejected_connections.load(Ordering::Relaxed)
    }

    /// Get a point-in-time view of all metrics
    ///
    /// Counters updated concurrently may be off by one between fields.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            rejected_connections: self.rejected_connections.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            network_closes: self.network_closes.load(Ordering::Relaxed),
            local_closes: self.local_closes.load(Ordering::Relaxed),
            logouts: self.logouts.load(Ordering::Relaxed),
            session_errors: self.session_errors.load(Ordering::Relaxed),
            accept_errors: self.accept_errors.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
            avg_connection_duration: self.average_connection_duration(),
        }
    }

    fn average_connection_duration(&self) -> Duration {
        let closed = self.total_connections.load(Ordering::Relaxed)
            - self.active_connections.load(Ordering::Relaxed);
        if closed == 0 {
            return Duration::ZERO;
        }
        let total_ns = self.total_connection_duration_ns.load(Ordering::Relaxed);
        Duration::from_nanos(total_ns / closed)
    }
}

/// A snapshot of server metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Total connections since server start
    pub total_connections: u64,
    /// Current active connections
    pub active_connections: u64,
    /// Connections closed at the connection limit
    pub rejected_connections: u64,
    /// Bytes sent to clients by finished sessions
    pub bytes_sent: u64,
    /// Bytes received from clients by finished sessions
    pub bytes_received: u64,
    /// Sessions ended by the client closing the connection
    pub network_closes: u64,
    /// Sessions ended by the shell going away
    pub local_closes: u64,
    /// Sessions ended by a TELNET logout
    pub logouts: u64,
    /// Sessions ended by an error
    pub session_errors: u64,
    /// Failed accepts
    pub accept_errors: u64,
    /// Server uptime
    pub uptime: Duration,
    /// Average duration of closed connections
    pub avg_connection_duration: Duration,
}

impl MetricsSnapshot {
    /// Calculate bytes per second (sent)
    pub fn bytes_sent_per_sec(&self) -> f64 {
        if self.uptime.is_zero() {
            return 0.0;
        }
        self.bytes_sent as f64 / self.uptime.as_secs_f64()
    }

    /// Calculate bytes per second (received)
    pub fn bytes_received_per_sec(&self) -> f64 {
        if self.uptime.is_zero() {
            return 0.0;
        }
        self.bytes_received as f64 / self.uptime.as_secs_f64()
    }

    /// Total sessions that have ended
    pub fn closed_sessions(&self) -> u64 {
        self.network_closes + self.local_closes + self.logouts + self.session_errors
    }
}
