//! Fire and forget sinks for observability events and background tasks.

use std::fmt::Display;

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

pub trait EventMonitor<T>: Send + Sync {
    fn on_event(&self, evt: T);
}

impl<U> EventMonitor<U> for Box<dyn EventMonitor<U>> {
    fn on_event(&self, evt: U) {
        self.as_ref().on_event(evt)
    }
}

impl<T, U> EventMonitor<U> for &T
where
    T: EventMonitor<U> + ?Sized,
{
    fn on_event(&self, evt: U) {
        (**self).on_event(evt)
    }
}

/// An [EventMonitor] that is just a noop
pub struct NoopMonitor;

impl<T> EventMonitor<T> for NoopMonitor {
    fn on_event(&self, _evt: T) {
        // noop
    }
}

impl NoopMonitor {
    pub fn new() -> Self {
        Self {}
    }
}

/// Hands every event to each of the inner monitors
pub struct FanoutMonitor<T> {
    monitors: Vec<Box<dyn EventMonitor<T>>>,
}

impl<T> FanoutMonitor<T> {
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    pub fn with<M: EventMonitor<T> + 'static>(mut self, monitor: M) -> Self {
        self.monitors.push(Box::new(monitor));
        self
    }
}

impl<T: Clone> EventMonitor<T> for FanoutMonitor<T> {
    fn on_event(&self, evt: T) {
        for mon in &self.monitors {
            mon.on_event(evt.clone());
        }
    }
}

/// An [EventMonitor] that dumps the events onto a bounded channel.
///
/// Sending never blocks: when the channel is full or the receiver is gone the
/// event is dropped with a warning.
pub struct ChannelEventMonitor<T>
where
    T: Sync + Send,
{
    chan: Sender<T>,
}

impl<T> ChannelEventMonitor<T>
where
    T: Sync + Send,
{
    pub fn create() -> (Self, Receiver<T>) {
        Self::create_with_bound(16)
    }

    pub fn create_with_bound(bound: usize) -> (Self, Receiver<T>) {
        let (tx, rx) = bounded(bound);
        (Self::new(tx), rx)
    }

    pub fn new(chan: Sender<T>) -> Self {
        Self { chan }
    }
}

impl<T> EventMonitor<T> for ChannelEventMonitor<T>
where
    T: Sync + Send + Display,
{
    fn on_event(&self, evt: T) {
        match self.chan.try_send(evt) {
            Ok(()) => {}
            Err(TrySendError::Full(evt)) => log::warn!("sink full, dropping {}", evt),
            Err(TrySendError::Disconnected(evt)) => {
                log::warn!("sink disconnected, dropping {}", evt)
            }
        }
    }
}

/// An [EventMonitor] that writes every event to the log
pub struct LogMonitor {
    target: &'static str,
}

impl LogMonitor {
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new("uxengine::events")
    }
}

impl<T: Display> EventMonitor<T> for LogMonitor {
    fn on_event(&self, evt: T) {
        log::info!(target: self.target, "{}", evt);
    }
}
