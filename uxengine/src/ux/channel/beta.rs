use serde::{Deserialize, Serialize};

use super::{
    consent_notification, debug_mode, notify, reset_and_notify, unconsumed_reset_token,
    ChannelCandidate, EnrollmentEnv, ALREADY_ENROLLED_CHANNEL, DEBUG_CHANNEL,
    FIRST_CONSENT_CHANNEL, RESET_CHANNEL,
};
use crate::consent::{ConsentState, NotificationKind};
use crate::flags::FlagState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetaChannel {
    ConsentNotificationDebug,
    ConsentNotificationReset,
    AlreadyEnrolled,
    FirstConsentNotification,
}

impl ChannelCandidate for BetaChannel {
    const ALL: &'static [Self] = &[
        Self::ConsentNotificationDebug,
        Self::ConsentNotificationReset,
        Self::AlreadyEnrolled,
        Self::FirstConsentNotification,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::ConsentNotificationDebug => DEBUG_CHANNEL,
            Self::ConsentNotificationReset => RESET_CHANNEL,
            Self::AlreadyEnrolled => ALREADY_ENROLLED_CHANNEL,
            Self::FirstConsentNotification => FIRST_CONSENT_CHANNEL,
        }
    }

    fn is_eligible(&self, state: &ConsentState, flags: &dyn FlagState) -> bool {
        match self {
            Self::ConsentNotificationDebug => debug_mode(flags),
            Self::ConsentNotificationReset => unconsumed_reset_token(state, flags).is_some(),
            Self::AlreadyEnrolled => state.was_displayed(NotificationKind::Beta),
            Self::FirstConsentNotification => !state.any_notification_displayed(),
        }
    }

    fn handle_enrollment(&self, env: &EnrollmentEnv) -> crate::Result<()> {
        let kind = NotificationKind::Beta;
        let task = consent_notification(env, false);
        match self {
            Self::ConsentNotificationDebug => {
                notify(env, kind, task, false)?;
            }
            Self::ConsentNotificationReset => reset_and_notify(env, kind, task)?,
            Self::AlreadyEnrolled => {}
            Self::FirstConsentNotification => {
                notify(env, kind, task, true)?;
            }
        }
        Ok(())
    }
}
