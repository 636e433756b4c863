//! Observability and Metrics
//!
//! Counters for hook pipeline activity. Every broker owns its own
//! [`HookMetrics`]; channels share it through an `Arc`.
//!
//! Uses atomic counters for thread-safe metrics collection.

use crate::core::packet::PacketKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for hook dispatch
#[derive(Debug)]
pub struct HookMetrics {
    /// Dispatch calls, indexed by packet kind
    dispatches: [AtomicU64; 5],
    /// Handler invocations that returned a response
    pub handlers_invoked: AtomicU64,
    /// Handler invocations that returned an error
    pub handler_errors: AtomicU64,
    /// Chains stopped early by a handler
    pub plugin_vetoes: AtomicU64,
    /// Chains whose final response skipped server processing
    pub server_vetoes: AtomicU64,
    /// Connection approvals whose final response denied admission
    pub connections_denied: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl HookMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            dispatches: Default::default(),
            handlers_invoked: AtomicU64::new(0),
            handler_errors: AtomicU64::new(0),
            plugin_vetoes: AtomicU64::new(0),
            server_vetoes: AtomicU64::new(0),
            connections_denied: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a dispatch call on a channel
    pub fn dispatched(&self, kind: PacketKind) {
        self.dispatches[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Record a handler that returned a response
    pub fn handler_invoked(&self) {
        self.handlers_invoked.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a handler that returned an error
    pub fn handler_failed(&self) {
        self.handler_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chain stopped by a handler
    pub fn plugin_veto(&self) {
        self.plugin_vetoes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chain that skips server processing
    pub fn server_veto(&self) {
        self.server_vetoes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected connection
    pub fn connection_denied(&self) {
        self.connections_denied.fetch_add(1, Ordering::Relaxed);
    }

    /// Dispatch count for one kind
    pub fn dispatches(&self, kind: PacketKind) -> u64 {
        self.dispatches[kind.index()].load(Ordering::Relaxed)
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            incoming_packets: self.dispatches(PacketKind::IncomingPacket),
            pings: self.dispatches(PacketKind::Ping),
            queries: self.dispatches(PacketKind::Query),
            connection_approvals: self.dispatches(PacketKind::ConnectionApproval),
            status_changes: self.dispatches(PacketKind::StatusChange),
            handlers_invoked: self.handlers_invoked.load(Ordering::Relaxed),
            handler_errors: self.handler_errors.load(Ordering::Relaxed),
            plugin_vetoes: self.plugin_vetoes.load(Ordering::Relaxed),
            server_vetoes: self.server_vetoes.load(Ordering::Relaxed),
            connections_denied: self.connections_denied.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            incoming_packets = snapshot.incoming_packets,
            pings = snapshot.pings,
            queries = snapshot.queries,
            connection_approvals = snapshot.connection_approvals,
            status_changes = snapshot.status_changes,
            handlers_invoked = snapshot.handlers_invoked,
            handler_errors = snapshot.handler_errors,
            plugin_vetoes = snapshot.plugin_vetoes,
            server_vetoes = snapshot.server_vetoes,
            connections_denied = snapshot.connections_denied,
            uptime_seconds = snapshot.uptime_seconds,
            "Hook metrics snapshot"
        );
    }
}

impl Default for HookMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub incoming_packets: u64,
    pub pings: u64,
    pub queries: u64,
    pub connection_approvals: u64,
    pub status_changes: u64,
    pub handlers_invoked: u64,
    pub handler_errors: u64,
    pub plugin_vetoes: u64,
    pub server_vetoes: u64,
    pub connections_denied: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// Dispatches across all kinds
    pub fn total_dispatches(&self) -> u64 {
        self.incoming_packets
            + self.pings
            + self.queries
            + self.connection_approvals
            + self.status_changes
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
