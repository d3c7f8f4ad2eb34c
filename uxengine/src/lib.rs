pub mod context;
pub use context::{Context, DefaultContext};

pub mod config;

pub mod errors;
pub use errors::{Error, Result};

pub mod flags;
pub use flags::{FlagState, StaticFlags, UxFlags};

pub mod consent;
pub use consent::{
    ApiConsent, ApiType, ConsentState, ConsentStore, FileConsentStore, MemoryConsentStore,
    NotificationKind, Region,
};

pub mod monitor;
pub use monitor::{ChannelEventMonitor, EventMonitor, FanoutMonitor, LogMonitor, NoopMonitor};

pub mod ux;
pub use ux::{
    BackgroundTask, EnrollmentChannel, PrivacySandboxUx, RequestStates, SelectionEngine,
    SelectionOutcome, UxEvent,
};

pub mod utils;

#[cfg(test)]
pub mod testing;
