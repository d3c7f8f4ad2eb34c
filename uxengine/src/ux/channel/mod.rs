//! Enrollment channels: the ways a UX can enroll a user.
//!
//! Each UX owns a closed, ordered set of channels. The first channel whose
//! predicate passes is selected and its handler performs the enrollment
//! action, usually queueing a consent notification.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::{BackgroundTask, PrivacySandboxUx, RequestStates};
use crate::consent::{ConsentState, ConsentStore, NotificationKind};
use crate::flags::{
    FlagState, KEY_CONSENT_NOTIFICATION_DEBUG_MODE, KEY_CONSENT_NOTIFICATION_RESET_TOKEN,
};
use crate::monitor::EventMonitor;

mod beta;
mod ga;
mod rvc;
mod u18;

pub use beta::BetaChannel;
pub use ga::GaChannel;
pub use rvc::RvcChannel;
pub use u18::U18Channel;

/// Everything a channel handler may touch
pub struct EnrollmentEnv<'a> {
    pub store: &'a dyn ConsentStore,
    pub flags: &'a dyn FlagState,
    pub tasks: &'a dyn EventMonitor<BackgroundTask>,
    pub request: &'a RequestStates,
}

/// One UX's set of channels
pub trait ChannelCandidate: Copy + 'static {
    /// All channels in precedence order
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn is_eligible(&self, state: &ConsentState, flags: &dyn FlagState) -> bool;

    fn handle_enrollment(&self, env: &EnrollmentEnv) -> crate::Result<()>;
}

/// A channel tagged with the UX it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "ux", content = "channel")]
pub enum EnrollmentChannel {
    Ga(GaChannel),
    Beta(BetaChannel),
    U18(U18Channel),
    Rvc(RvcChannel),
}

impl EnrollmentChannel {
    pub fn ux(&self) -> PrivacySandboxUx {
        match self {
            Self::Ga(_) => PrivacySandboxUx::Ga,
            Self::Beta(_) => PrivacySandboxUx::Beta,
            Self::U18(_) => PrivacySandboxUx::U18,
            Self::Rvc(_) => PrivacySandboxUx::Rvc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ga(c) => c.as_str(),
            Self::Beta(c) => c.as_str(),
            Self::U18(c) => c.as_str(),
            Self::Rvc(c) => c.as_str(),
        }
    }

    pub fn is_eligible(&self, state: &ConsentState, flags: &dyn FlagState) -> bool {
        let eligible = match self {
            Self::Ga(c) => c.is_eligible(state, flags),
            Self::Beta(c) => c.is_eligible(state, flags),
            Self::U18(c) => c.is_eligible(state, flags),
            Self::Rvc(c) => c.is_eligible(state, flags),
        };
        log::debug!("channel {} eligible: {}", self, eligible);
        eligible
    }

    pub fn handle_enrollment(&self, env: &EnrollmentEnv) -> crate::Result<()> {
        match self {
            Self::Ga(c) => c.handle_enrollment(env),
            Self::Beta(c) => c.handle_enrollment(env),
            Self::U18(c) => c.handle_enrollment(env),
            Self::Rvc(c) => c.handle_enrollment(env),
        }
    }
}

impl Display for EnrollmentChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ux(), self.as_str())
    }
}

pub(super) const DEBUG_CHANNEL: &'static str = "CONSENT_NOTIFICATION_DEBUG_CHANNEL";
pub(super) const RESET_CHANNEL: &'static str = "CONSENT_NOTIFICATION_RESET_CHANNEL";
pub(super) const ALREADY_ENROLLED_CHANNEL: &'static str = "ALREADY_ENROLLED_CHANNEL";
pub(super) const FIRST_CONSENT_CHANNEL: &'static str = "FIRST_CONSENT_NOTIFICATION_CHANNEL";

fn debug_mode(flags: &dyn FlagState) -> bool {
    flags.get_flag(KEY_CONSENT_NOTIFICATION_DEBUG_MODE)
}

/// The reset token from the flags if it hasn't been consumed yet
fn unconsumed_reset_token(state: &ConsentState, flags: &dyn FlagState) -> Option<String> {
    let token = flags.get_string(KEY_CONSENT_NOTIFICATION_RESET_TOKEN)?;
    if token.is_empty() || state.reset_token.as_deref() == Some(token.as_str()) {
        return None;
    }
    Some(token)
}

fn consent_notification(env: &EnrollmentEnv, reconsent: bool) -> BackgroundTask {
    BackgroundTask::ScheduleConsentNotification {
        ad_id_enabled: env.request.ad_id_enabled,
        reconsent,
    }
}

fn notification_v2(env: &EnrollmentEnv, renotify: bool) -> BackgroundTask {
    BackgroundTask::ScheduleNotificationV2 {
        ad_id_enabled: env.request.ad_id_enabled,
        renotify,
    }
}

/// Mark `kind` pending and queue `task`.
///
/// With `first_time` set nothing is queued when the notification is already
/// pending. Returns whether the task was queued.
fn notify(
    env: &EnrollmentEnv,
    kind: NotificationKind,
    task: BackgroundTask,
    first_time: bool,
) -> crate::Result<bool> {
    let mut queue = true;
    env.store.update(&mut |state| {
        if first_time && state.is_pending(kind) {
            queue = false;
        } else {
            state.pending.insert(kind);
        }
    })?;

    if queue {
        log::debug!("queueing {} notification", kind);
        env.tasks.on_event(task);
    } else {
        log::debug!("{} notification already pending", kind);
    }
    Ok(queue)
}

/// Consume the reset token, forget every notification marker and notify again
fn reset_and_notify(
    env: &EnrollmentEnv,
    kind: NotificationKind,
    task: BackgroundTask,
) -> crate::Result<()> {
    let token = env.flags.get_string(KEY_CONSENT_NOTIFICATION_RESET_TOKEN);
    env.store.update(&mut |state| {
        state.reset_token = token.clone();
        state.displayed.clear();
        state.pending.clear();
        state.pending.insert(kind);
    })?;
    log::info!("consent notification reset, queueing {} notification", kind);
    env.tasks.on_event(task);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consent::MemoryConsentStore;
    use crate::flags::StaticFlags;
    use crate::testing::RecordingMonitor;

    #[test]
    fn test_reset_token() {
        let mut flags = StaticFlags::new();
        let mut state = ConsentState::default();
        assert_eq!(unconsumed_reset_token(&state, &flags), None);

        flags.set_string(KEY_CONSENT_NOTIFICATION_RESET_TOKEN, "");
        assert_eq!(unconsumed_reset_token(&state, &flags), None);

        flags.set_string(KEY_CONSENT_NOTIFICATION_RESET_TOKEN, "t1");
        assert_eq!(
            unconsumed_reset_token(&state, &flags),
            Some(String::from("t1"))
        );

        state.reset_token = Some(String::from("t1"));
        assert_eq!(unconsumed_reset_token(&state, &flags), None);
    }

    #[test]
    fn test_notify_first_time() {
        let store = MemoryConsentStore::new();
        let flags = StaticFlags::new();
        let tasks: RecordingMonitor<BackgroundTask> = RecordingMonitor::new();
        let request = RequestStates::default();
        let env = EnrollmentEnv {
            store: &store,
            flags: &flags,
            tasks: &tasks,
            request: &request,
        };

        let task = consent_notification(&env, false);
        assert!(notify(&env, NotificationKind::Ga, task.clone(), true).expect("notify"));
        assert!(!notify(&env, NotificationKind::Ga, task.clone(), true).expect("notify"));
        // Not first time only, always queued
        assert!(notify(&env, NotificationKind::Ga, task.clone(), false).expect("notify"));
        assert_eq!(tasks.take(), vec![task.clone(), task]);
    }

    #[test]
    fn test_channel_json() {
        let channel = EnrollmentChannel::U18(U18Channel::U18Detention);
        let json = serde_json::to_string(&channel).expect("serialize");
        assert_eq!(json, r#"{"ux":"U18","channel":"U18Detention"}"#);
        let back: EnrollmentChannel = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, channel);
        assert_eq!(channel.to_string(), "U18_UX/U18_DETENTION_CHANNEL");
    }
}
