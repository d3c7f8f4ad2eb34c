use serde::{Deserialize, Serialize};

use super::{
    consent_notification, debug_mode, notify, reset_and_notify, unconsumed_reset_token,
    ChannelCandidate, EnrollmentEnv, ALREADY_ENROLLED_CHANNEL, DEBUG_CHANNEL,
    FIRST_CONSENT_CHANNEL, RESET_CHANNEL,
};
use crate::consent::{ApiConsent, ApiType, ConsentState, NotificationKind};
use crate::flags::{FlagState, KEY_IS_U18_UX_DETENTION_CHANNEL_ENABLED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum U18Channel {
    ConsentNotificationDebug,
    ConsentNotificationReset,
    AlreadyEnrolled,
    FirstConsentNotification,
    /// Adult accounts later detected as under 18
    U18Detention,
}

impl ChannelCandidate for U18Channel {
    const ALL: &'static [Self] = &[
        Self::ConsentNotificationDebug,
        Self::ConsentNotificationReset,
        Self::AlreadyEnrolled,
        Self::FirstConsentNotification,
        Self::U18Detention,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::ConsentNotificationDebug => DEBUG_CHANNEL,
            Self::ConsentNotificationReset => RESET_CHANNEL,
            Self::AlreadyEnrolled => ALREADY_ENROLLED_CHANNEL,
            Self::FirstConsentNotification => FIRST_CONSENT_CHANNEL,
            Self::U18Detention => "U18_DETENTION_CHANNEL",
        }
    }

    fn is_eligible(&self, state: &ConsentState, flags: &dyn FlagState) -> bool {
        match self {
            Self::ConsentNotificationDebug => debug_mode(flags),
            Self::ConsentNotificationReset => unconsumed_reset_token(state, flags).is_some(),
            Self::AlreadyEnrolled => state.was_displayed(NotificationKind::U18),
            Self::FirstConsentNotification => !state.any_notification_displayed(),
            Self::U18Detention => {
                flags.get_flag(KEY_IS_U18_UX_DETENTION_CHANNEL_ENABLED)
                    && (state.was_displayed(NotificationKind::Ga)
                        || state.was_displayed(NotificationKind::Pas))
                    && !state.was_displayed(NotificationKind::U18)
            }
        }
    }

    fn handle_enrollment(&self, env: &EnrollmentEnv) -> crate::Result<()> {
        let kind = NotificationKind::U18;
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
            Self::U18Detention => {
                // Silent: the U18 experience only keeps measurement
                env.store.update(&mut |state| {
                    state.set_consent_for(ApiType::Topics, ApiConsent::Revoked);
                    state.set_consent_for(ApiType::Fledge, ApiConsent::Revoked);
                    state.displayed.insert(kind);
                })?;
                log::info!("moved account into the U18 experience");
            }
        }
        Ok(())
    }
}
