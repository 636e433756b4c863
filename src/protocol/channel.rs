//! Event channels: ordered handler chains for one packet kind.
//!
//! Dispatch is a single ordered fold with early exit. Each handler sees the
//! message as left by its predecessor; the first handler that clears
//! `continue_plugins` ends the chain and its response is returned as is.
//! Errors raised by handlers are returned to the caller untouched.
//!
//! Handler lists are copy-on-write. Dispatch takes a snapshot under a short
//! read lock and iterates without holding it, so a handler registered while
//! packets are in flight is picked up from the next dispatch on and is never
//! seen half-appended.

use crate::config::HookConfig;
use crate::core::packet::PacketKind;
use crate::error::{constants, HookError, Result};
use crate::protocol::response::{Response, SignalResponse};
use crate::utils::metrics::HookMetrics;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// Handler of a payload-bearing channel. Takes the current message by value.
pub type PacketHandlerFn<P, M, S> =
    dyn Fn(&P, M) -> Result<Response<M, S>> + Send + Sync + 'static;

/// Handler of an observe-only channel. Only borrows the message.
pub type SignalHandlerFn<P, M> = dyn Fn(&P, &M) -> Result<SignalResponse> + Send + Sync + 'static;

type Snapshot<H> = Arc<Vec<Arc<H>>>;

/// Registration order list shared by both channel flavours
struct HandlerList<H: ?Sized> {
    kind: PacketKind,
    handlers: RwLock<Snapshot<H>>,
    capacity: Option<usize>,
    trace_handlers: bool,
    metrics: Arc<HookMetrics>,
}

impl<H: ?Sized> HandlerList<H> {
    fn new(kind: PacketKind, config: &HookConfig, metrics: Arc<HookMetrics>) -> Self {
        Self {
            kind,
            handlers: RwLock::new(Arc::new(Vec::new())),
            capacity: config.capacity(),
            trace_handlers: config.trace_handlers,
            metrics,
        }
    }

    fn push(&self, handler: Arc<H>) -> Result<()> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| HookError::LockPoisoned(constants::ERR_CHANNEL_WRITE_LOCK))?;

        if let Some(limit) = self.capacity {
            if handlers.len() >= limit {
                return Err(HookError::CapacityExceeded {
                    kind: self.kind,
                    limit,
                });
            }
        }

        // Clones the list only while a dispatch still holds the old snapshot
        Arc::make_mut(&mut *handlers).push(handler);
        debug!(
            kind = self.kind.name(),
            position = handlers.len() - 1,
            "Hook handler registered"
        );
        Ok(())
    }

    fn snapshot(&self) -> Result<Snapshot<H>> {
        let handlers = self
            .handlers
            .read()
            .map_err(|_| HookError::LockPoisoned(constants::ERR_CHANNEL_READ_LOCK))?;
        Ok(Arc::clone(&*handlers))
    }

    fn len(&self) -> usize {
        match self.handlers.read() {
            Ok(handlers) => handlers.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Bookkeeping around a single handler call
    #[inline]
    fn invoke<R>(&self, position: usize, call: impl FnOnce() -> Result<R>) -> Result<R> {
        if self.trace_handlers {
            trace!(kind = self.kind.name(), handler = position, "Invoking hook handler");
        }
        match call() {
            Ok(response) => {
                self.metrics.handler_invoked();
                Ok(response)
            }
            Err(e) => {
                self.metrics.handler_failed();
                debug!(kind = self.kind.name(), handler = position, error = %e, "Hook handler failed");
                Err(e)
            }
        }
    }

    fn stopped_at(&self, position: usize) {
        self.metrics.plugin_veto();
        debug!(
            kind = self.kind.name(),
            handler = position,
            "Hook handler stopped plugin processing"
        );
    }
}

/// Channel whose handlers may rewrite the message.
///
/// `S` is the side value carried next to the payload (`()` for plain
/// packets, `bool` admission flag for connection approval). Every dispatch
/// starts from the seed value given at construction.
pub struct EventChannel<P, M, S = ()> {
    list: HandlerList<PacketHandlerFn<P, M, S>>,
    initial_secondary: S,
}

impl<P, M, S: Clone> EventChannel<P, M, S> {
    pub fn new(kind: PacketKind, initial_secondary: S) -> Self {
        Self::with_config(
            kind,
            initial_secondary,
            &HookConfig::default(),
            Arc::new(HookMetrics::new()),
        )
    }

    pub fn with_config(
        kind: PacketKind,
        initial_secondary: S,
        config: &HookConfig,
        metrics: Arc<HookMetrics>,
    ) -> Self {
        Self {
            list: HandlerList::new(kind, config, metrics),
            initial_secondary,
        }
    }

    /// Append a handler. Registration order is chain order.
    pub fn register<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&P, M) -> Result<Response<M, S>> + Send + Sync + 'static,
    {
        self.list.push(Arc::new(handler))
    }

    /// Run the chain for one message.
    pub fn dispatch(&self, peer: &P, message: M) -> Result<Response<M, S>> {
        self.list.metrics.dispatched(self.list.kind);
        let handlers = self.list.snapshot()?;

        let mut result = Response {
            continue_plugins: true,
            continue_server: true,
            payload: message,
            secondary: self.initial_secondary.clone(),
        };

        for (position, handler) in handlers.iter().enumerate() {
            let current = result.payload;
            result = self.list.invoke(position, || handler(peer, current))?;
            if !result.continue_plugins {
                self.list.stopped_at(position);
                break;
            }
        }

        if !result.continue_server {
            self.list.metrics.server_veto();
        }
        Ok(result)
    }

    pub fn kind(&self) -> PacketKind {
        self.list.kind
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Channel whose handlers only observe the message.
pub struct SignalChannel<P, M> {
    list: HandlerList<SignalHandlerFn<P, M>>,
}

impl<P, M> SignalChannel<P, M> {
    pub fn new(kind: PacketKind) -> Self {
        Self::with_config(kind, &HookConfig::default(), Arc::new(HookMetrics::new()))
    }

    pub fn with_config(kind: PacketKind, config: &HookConfig, metrics: Arc<HookMetrics>) -> Self {
        Self {
            list: HandlerList::new(kind, config, metrics),
        }
    }

    /// Append a handler. Registration order is chain order.
    pub fn register<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&P, &M) -> Result<SignalResponse> + Send + Sync + 'static,
    {
        self.list.push(Arc::new(handler))
    }

    /// Run the chain for one message.
    pub fn dispatch(&self, peer: &P, message: &M) -> Result<SignalResponse> {
        self.list.metrics.dispatched(self.list.kind);
        let handlers = self.list.snapshot()?;

        let mut result = SignalResponse::proceed();
        for (position, handler) in handlers.iter().enumerate() {
            result = self.list.invoke(position, || handler(peer, message))?;
            if !result.continue_plugins {
                self.list.stopped_at(position);
                break;
            }
        }

        if !result.continue_server {
            self.list.metrics.server_veto();
        }
        Ok(result)
    }

    pub fn kind(&self) -> PacketKind {
        self.list.kind
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::response::PacketResponse;

    #[test]
    #[allow(clippy::expect_used)]
    fn test_empty_channel_passes_through() {
        let channel: EventChannel<(), &str> = EventChannel::new(PacketKind::IncomingPacket, ());
        let response = channel.dispatch(&(), "x").expect("dispatch");
        assert_eq!(response, PacketResponse::forward("x"));
        assert!(channel.is_empty());
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_capacity_enforced() {
        let config = HookConfig {
            max_handlers_per_channel: 1,
            ..HookConfig::default()
        };
        let channel: SignalChannel<(), ()> =
            SignalChannel::with_config(PacketKind::Ping, &config, Arc::new(HookMetrics::new()));

        channel
            .register(|_, _| Ok(SignalResponse::proceed()))
            .expect("first handler fits");
        let err = channel
            .register(|_, _| Ok(SignalResponse::proceed()))
            .expect_err("second handler exceeds capacity");

        assert!(matches!(
            err,
            HookError::CapacityExceeded {
                kind: PacketKind::Ping,
                limit: 1
            }
        ));
        assert_eq!(channel.len(), 1);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_registration_during_dispatch_applies_next_time() {
        let channel: Arc<SignalChannel<(), ()>> = Arc::new(SignalChannel::new(PacketKind::Query));
        let inner = Arc::clone(&channel);
        channel
            .register(move |_, _| {
                inner.register(|_, _| Ok(SignalResponse::proceed().stop_server()))?;
                Ok(SignalResponse::proceed())
            })
            .expect("register");

        let first = channel.dispatch(&(), &()).expect("first dispatch");
        assert!(first.continue_server);
        assert_eq!(channel.len(), 2);

        let second = channel.dispatch(&(), &()).expect("second dispatch");
        assert!(!second.continue_server);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_len_reports_real_count_after_poisoning() {
        let channel: Arc<SignalChannel<(), ()>> = Arc::new(SignalChannel::new(PacketKind::Ping));
        channel
            .register(|_, _| Ok(SignalResponse::proceed()))
            .expect("register");

        let holder = Arc::clone(&channel);
        let joined = std::thread::spawn(move || {
            let _guard = holder.list.handlers.write();
            panic!("writer died holding the handler list");
        })
        .join();
        assert!(joined.is_err());

        assert_eq!(channel.len(), 1);
        assert!(!channel.is_empty());
        assert!(matches!(
            channel.dispatch(&(), &()),
            Err(HookError::LockPoisoned(_))
        ));
    }
}
