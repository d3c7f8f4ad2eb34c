use serde::{Deserialize, Serialize};

use super::{
    consent_notification, debug_mode, notify, ChannelCandidate, EnrollmentEnv,
    ALREADY_ENROLLED_CHANNEL, DEBUG_CHANNEL, FIRST_CONSENT_CHANNEL,
};
use crate::consent::{ConsentState, NotificationKind};
use crate::flags::FlagState;

/// RVC has no reset channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RvcChannel {
    ConsentNotificationDebug,
    AlreadyEnrolled,
    FirstConsentNotification,
}

impl ChannelCandidate for RvcChannel {
    const ALL: &'static [Self] = &[
        Self::ConsentNotificationDebug,
        Self::AlreadyEnrolled,
        Self::FirstConsentNotification,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::ConsentNotificationDebug => DEBUG_CHANNEL,
            Self::AlreadyEnrolled => ALREADY_ENROLLED_CHANNEL,
            Self::FirstConsentNotification => FIRST_CONSENT_CHANNEL,
        }
    }

    fn is_eligible(&self, state: &ConsentState, flags: &dyn FlagState) -> bool {
        match self {
            Self::ConsentNotificationDebug => debug_mode(flags),
            Self::AlreadyEnrolled => state.was_displayed(NotificationKind::Rvc),
            Self::FirstConsentNotification => !state.any_notification_displayed(),
        }
    }

    fn handle_enrollment(&self, env: &EnrollmentEnv) -> crate::Result<()> {
        let kind = NotificationKind::Rvc;
        match self {
            Self::ConsentNotificationDebug => {
                notify(env, kind, consent_notification(env, false), false)?;
            }
            Self::AlreadyEnrolled => {}
            Self::FirstConsentNotification => {
                notify(env, kind, consent_notification(env, false), true)?;
            }
        }
        Ok(())
    }
}
