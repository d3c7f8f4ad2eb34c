use std::sync::Mutex;

use mockall::mock;

use crate::consent::{ConsentState, ConsentStore};
use crate::flags::FlagState;
use crate::monitor::EventMonitor;

mock! {
    pub Flags {}

    impl FlagState for Flags {
        fn get_flag(&self, key: &str) -> bool;
        fn get_string(&self, key: &str) -> Option<String>;
    }
}

/// An [EventMonitor] that keeps everything it was given
pub struct RecordingMonitor<T> {
    events: Mutex<Vec<T>>,
}

impl<T> RecordingMonitor<T> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<T> {
        let mut events = self.events.lock().expect("failed to lock");
        events.drain(..).collect()
    }
}

impl<T: Send> EventMonitor<T> for RecordingMonitor<T> {
    fn on_event(&self, evt: T) {
        self.events.lock().expect("failed to lock").push(evt);
    }
}

/// A [ConsentStore] whose backing storage is always gone
pub struct FailingConsentStore;

impl ConsentStore for FailingConsentStore {
    fn get(&self) -> crate::Result<ConsentState> {
        Err(crate::Error::new_store("test store is unavailable"))
    }

    fn update(&self, _f: &mut dyn FnMut(&mut ConsentState)) -> crate::Result<ConsentState> {
        Err(crate::Error::new_store("test store is unavailable"))
    }
}
