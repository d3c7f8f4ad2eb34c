//! UX and enrollment channel selection.
//!
//! [SelectionEngine::start] persists the request, picks the first eligible
//! [PrivacySandboxUx], then the first eligible [EnrollmentChannel] of that
//! UX, and runs the channel's enrollment action.

mod background;
pub use background::{
    background_tasks_upon_consent, start_background_tasks_upon_consent, BackgroundTask,
};

pub mod channel;
pub use channel::{ChannelCandidate, EnrollmentChannel, EnrollmentEnv};

mod engine;
pub use engine::{SelectionEngine, SelectionOutcome};

mod events;
pub use events::UxEvent;

mod request;
pub use request::{RequestStates, RequestStatesBuilder};

mod select;
pub use select::{first_match, select_channel, select_ux};

mod variant;
pub use variant::PrivacySandboxUx;
