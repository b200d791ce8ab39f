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


//! The per-connection session loop.
//!
//! A [`Session`] owns the four buffers, the protocol [`Engine`] and both
//! endpoints. [`Session::poll_once`] moves bytes one step in every
//! direction without waiting; [`Session::run`] repeats it, parking on
//! endpoint readiness or the poll interval whenever a step made no
//! progress.

use crate::buffer::Buffers;
use crate::clocks::Stamp;
use crate::config::{SessionConfig, UrgentPolicy};
use crate::endpoint::{LocalEndpoint, NetworkEndpoint};
use crate::engine::Engine;
use crate::error::{SessionError, SessionResult};
use crate::event::SessionEvent;
use crate::urgent::{FlushPlan, plan_flush};
use metrics::{counter, gauge, histogram};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telnetd_codec::TelnetOption;
use telnetd_codec::linemode::ForwardMask;
use tokio::io::Interest;
use tracing::{debug, error, info, instrument, trace, warn};

/// Why a session ended
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CloseReason {
    /// The client closed the connection
    NetworkClosed,
    /// The shell went away
    LocalClosed,
    /// The client asked us to log out
    Logout,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::NetworkClosed => write!(f, "network closed"),
            CloseReason::LocalClosed => write!(f, "local closed"),
            CloseReason::Logout => write!(f, "logout"),
        }
    }
}

/// Outcome of one [`Session::poll_once`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PollStatus {
    /// Bytes moved; poll again right away.
    Progress,
    /// Nothing could move; wait for an endpoint.
    Idle,
    /// The session is over.
    Finished(CloseReason),
}

/// Byte counters of a session
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SessionStats {
    /// Bytes read from the network
    pub bytes_received: u64,
    /// Bytes written to the network
    pub bytes_sent: u64,
    /// Keystrokes written to the local endpoint
    pub bytes_to_local: u64,
    /// Output read from the local endpoint
    pub bytes_from_local: u64,
}

/// What [`Session::run`] returns
#[derive(Clone, Debug)]
pub struct SessionSummary {
    /// Why the session ended
    pub reason: CloseReason,
    /// Byte counters at the end
    pub stats: SessionStats,
    /// Wall time from start to close
    pub duration: Duration,
}

/// One TELNET connection bridged to one local endpoint.
pub struct Session<N, L> {
    label: String,
    config: Arc<SessionConfig>,
    engine: Engine,
    buffers: Buffers,
    network: N,
    local: L,
    stats: SessionStats,
    started: bool,
    finished: Option<CloseReason>,
}

impl<N, L> std::fmt::Debug for Session<N, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("label", &self.label)
            .field("buffers", &self.buffers)
            .field("stats", &self.stats)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<N: NetworkEndpoint, L: LocalEndpoint> Session<N, L> {
    /// Creates a session. Nothing is sent until [`Session::start`].
    pub fn new(config: Arc<SessionConfig>, network: N, local: L) -> Self {
        Self {
            label: String::from("session"),
            engine: Engine::new(Arc::clone(&config)),
            buffers: Buffers::new(config.buffer_capacity()),
            config,
            network,
            local,
            stats: SessionStats::default(),
            started: false,
            finished: None,
        }
    }

    /// Names the session in logs.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Name used in logs
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Configuration in use
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Protocol state
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The four buffers
    pub fn buffers(&self) -> &Buffers {
        &self.buffers
    }

    /// Network endpoint
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Local endpoint
    pub fn local(&self) -> &L {
        &self.local
    }

    /// Byte counters so far
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Drains the protocol events recorded so far.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.engine.take_events()
    }

    /// Queues a LINEMODE forward mask request. False when linemode is off.
    pub fn request_forward_mask(&mut self, mask: ForwardMask) -> SessionResult<bool> {
        self.engine.request_forward_mask(mask, &mut self.buffers.net_out)
    }

    /// Records the clock baseline and queues the opening requests.
    #[instrument(skip(self), fields(session = %self.label))]
    pub fn start(&mut self) -> SessionResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        debug!("Starting negotiation");
        self.engine.start(&mut self.buffers.net_out)?;
        self.publish_terminal_mode();
        Ok(())
    }

    /// Runs one iteration of the loop without waiting.
    pub fn poll_once(&mut self) -> SessionResult<PollStatus> {
        if let Some(reason) = self.finished {
            return Ok(PollStatus::Finished(reason));
        }
        self.start()?;

        if !self.engine.is_synching() && self.network.has_out_of_band_pending()? {
            debug!(session = %self.label, "Urgent data pending, entering SYNCH");
            counter!("telnetd.synch.entered").increment(1);
            self.engine.set_synching(true);
        }

        let mut progress = false;
        if self.buffers.net_in.is_empty() {
            match self.network.recv(self.buffers.net_in.spare_mut()) {
                Ok(0) => return Ok(self.finish(CloseReason::NetworkClosed)),
                Ok(count) => {
                    self.buffers.net_in.commit(count);
                    self.stats.bytes_received += count as u64;
                    counter!("telnetd.session.bytes_in").increment(count as u64);
                    self.engine.settimer(Stamp::DidNetReceive);
                    progress = true;
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {}
                Err(error) if is_disconnect(&error) => return Ok(self.finish(CloseReason::NetworkClosed)),
                Err(error) => return Err(error.into()),
            }
        }

        progress |= self.read_local()?;
        progress |= self.bridge_local_output();
        match self.netflush() {
            Ok(sent) => progress |= sent,
            Err(SessionError::Io(error)) if is_disconnect(&error) => {
                return Ok(self.finish(CloseReason::NetworkClosed));
            }
            Err(error) => return Err(error),
        }
        progress |= self.telrcv()?;
        if self.engine.logout_requested() {
            return Ok(self.finish(CloseReason::Logout));
        }
        progress |= self.ptyflush()?;
        self.publish_terminal_mode();

        if self.local.is_closed() && self.buffers.local_in.is_empty() {
            if let Err(error) = self.engine.send_wont(TelnetOption::Echo, &mut self.buffers.net_out) {
                warn!(session = %self.label, error = %error, "Could not queue WONT ECHO");
            }
            return Ok(self.finish(CloseReason::LocalClosed));
        }
        Ok(if progress { PollStatus::Progress } else { PollStatus::Idle })
    }

    /// Drives the session until either side closes.
    #[instrument(skip(self), fields(session = %self.label))]
    pub async fn run(&mut self) -> SessionResult<SessionSummary> {
        let started = Instant::now();
        gauge!("telnetd.sessions.active").increment(1.0);
        let result = self.drive().await;
        gauge!("telnetd.sessions.active").decrement(1.0);
        histogram!("telnetd.session.duration").record(started.elapsed().as_secs_f64());
        match result {
            Ok(reason) => {
                info!(
                    reason = %reason,
                    bytes_received = self.stats.bytes_received,
                    bytes_sent = self.stats.bytes_sent,
                    "Session closed"
                );
                Ok(SessionSummary {
                    reason,
                    stats: self.stats,
                    duration: started.elapsed(),
                })
            }
            Err(error) => {
                error!(error = %error, "Session failed");
                self.local.hangup();
                Err(error)
            }
        }
    }

    async fn drive(&mut self) -> SessionResult<CloseReason> {
        self.start()?;
        let reason = loop {
            match self.poll_once()? {
                PollStatus::Progress => tokio::task::yield_now().await,
                PollStatus::Idle => self.wait().await?,
                PollStatus::Finished(reason) => break reason,
            }
        };
        match reason {
            CloseReason::NetworkClosed => self.local.hangup(),
            CloseReason::LocalClosed | CloseReason::Logout => {
                self.drain_network().await?;
                self.network.shutdown().await?;
                self.local.hangup();
            }
        }
        Ok(reason)
    }

    async fn wait(&mut self) -> SessionResult<()> {
        let readable = self.buffers.net_in.is_empty();
        let writable = !self.buffers.net_out.is_empty();
        let interest = match (readable, writable) {
            (true, true) => Some(Interest::READABLE | Interest::WRITABLE),
            (true, false) => Some(Interest::READABLE),
            (false, true) => Some(Interest::WRITABLE),
            (false, false) => None,
        };
        let want_local = self.buffers.local_in.is_empty() && !self.buffers.net_out.is_full();
        let poll_interval = self.config.poll_interval;
        let network = &mut self.network;
        let local = &mut self.local;
        tokio::select! {
            ready = network.ready(interest.unwrap_or(Interest::READABLE)), if interest.is_some() => {
                ready?;
            }
            _ = local.ready(), if want_local => {}
            _ = tokio::time::sleep(poll_interval) => {}
        }
        Ok(())
    }

    async fn drain_network(&mut self) -> SessionResult<()> {
        while !self.buffers.net_out.is_empty() {
            self.network.ready(Interest::WRITABLE).await?;
            if !self.netflush()? {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
        Ok(())
    }

    fn finish(&mut self, reason: CloseReason) -> PollStatus {
        info!(session = %self.label, reason = %reason, "Session finishing");
        self.finished = Some(reason);
        PollStatus::Finished(reason)
    }

    fn publish_terminal_mode(&mut self) {
        if let Some(mode) = self.engine.take_terminal_update() {
            trace!(session = %self.label, ?mode, "Publishing terminal mode");
            self.local.set_terminal_mode(&mode);
        }
    }

    fn read_local(&mut self) -> SessionResult<bool> {
        if !self.buffers.local_in.is_empty()
            || self.buffers.net_out.is_full()
            || self.local.output_pending() == 0
        {
            return Ok(false);
        }
        match self.local.read(self.buffers.local_in.spare_mut()) {
            Ok(count) => {
                self.buffers.local_in.commit(count);
                self.stats.bytes_from_local += count as u64;
                Ok(count > 0)
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    /// Moves local output into net-out, doubling IAC.
    fn bridge_local_output(&mut self) -> bool {
        if self.buffers.local_in.is_empty() {
            return false;
        }
        let taken = self.buffers.net_out.write_escaped(self.buffers.local_in.pending());
        self.buffers.local_in.consume(taken);
        taken > 0
    }

    /// Sends what net-out holds, honouring the urgent boundary.
    fn netflush(&mut self) -> SessionResult<bool> {
        if self.buffers.net_out.is_empty() {
            return Ok(false);
        }
        let urgent_capable =
            self.config.urgent_policy == UrgentPolicy::OutOfBand && self.network.supports_out_of_band();
        let result = match plan_flush(&self.buffers.net_out, urgent_capable) {
            FlushPlan::Normal(count) => self.network.send(&self.buffers.net_out.pending()[..count]),
            FlushPlan::OutOfBand => {
                let byte = self.buffers.net_out.pending()[0];
                trace!(session = %self.label, byte, "Sending urgent byte");
                self.network.send_out_of_band(byte).map(|()| 1)
            }
        };
        let sent = match result {
            Ok(sent) => sent,
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => 0,
            Err(error) => return Err(error.into()),
        };
        self.buffers.net_out.consume(sent);
        self.stats.bytes_sent += sent as u64;
        counter!("telnetd.session.bytes_out").increment(sent as u64);
        Ok(sent > 0)
    }

    /// Parses and acts on net-in.
    fn telrcv(&mut self) -> SessionResult<bool> {
        let mut progress = false;
        loop {
            if self.buffers.local_out.is_full()
                || self.buffers.net_out.tail_room() < self.config.effective_reply_reserve()
            {
                break;
            }
            let marks = self.engine.clocks().get(Stamp::GotDataMark);
            let Some(frame) = self.engine.next_frame(&mut self.buffers.net_in)? else {
                break;
            };
            progress = true;
            match self
                .engine
                .process(frame, &mut self.buffers.net_out, &mut self.buffers.local_out)
            {
                Ok(()) => {}
                Err(error @ (SessionError::BufferFull { .. } | SessionError::Codec(_))) => {
                    warn!(session = %self.label, error = %error, "Frame handling incomplete");
                    counter!("telnetd.session.dropped_replies").increment(1);
                }
                Err(error) => return Err(error),
            }
            if self.engine.clocks().get(Stamp::GotDataMark) != marks {
                let still_urgent = self.network.has_out_of_band_pending()?;
                self.engine.set_synching(still_urgent);
            }
            if self.engine.is_synching() || self.engine.logout_requested() {
                break;
            }
        }
        Ok(progress)
    }

    /// Writes decoded keystrokes to the local endpoint.
    fn ptyflush(&mut self) -> SessionResult<bool> {
        if self.buffers.local_out.is_empty() {
            return Ok(false);
        }
        match self.local.write(self.buffers.local_out.pending()) {
            Ok(count) => {
                self.buffers.local_out.consume(count);
                self.stats.bytes_to_local += count as u64;
                Ok(count > 0)
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(false),
            Err(error) if error.kind() == io::ErrorKind::BrokenPipe => {
                trace!(session = %self.label, "Local endpoint gone, dropping keystrokes");
                self.buffers.local_out.clear();
                Ok(false)
            }
            Err(error) => Err(error.into()),
        }
    }
}

fn is_disconnect(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe
    )
}
