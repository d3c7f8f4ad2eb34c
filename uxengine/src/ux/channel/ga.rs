use serde::{Deserialize, Serialize};

use super::{
    consent_notification, debug_mode, notification_v2, notify, reset_and_notify,
    unconsumed_reset_token, ChannelCandidate, EnrollmentEnv, ALREADY_ENROLLED_CHANNEL,
    DEBUG_CHANNEL, FIRST_CONSENT_CHANNEL, RESET_CHANNEL,
};
use crate::consent::{ConsentState, ManualInteraction, NotificationKind};
use crate::flags::{
    pas_ux_enabled, FlagState, KEY_GA_GRADUATION_CHANNEL_ENABLED, KEY_RVC_NOTIFICATION_ENABLED,
};
use crate::ux::BackgroundTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GaChannel {
    ConsentNotificationDebug,
    ConsentNotificationReset,
    PasFirstNotification,
    PasRenotifyNotification,
    AlreadyEnrolled,
    FirstConsentNotification,
    ReconsentNotification,
    /// U18 users that have become adults
    GaGraduation,
    /// RVC users after an OTA to a GA capable release
    RvcPostOta,
}

impl ChannelCandidate for GaChannel {
    const ALL: &'static [Self] = &[
        Self::ConsentNotificationDebug,
        Self::ConsentNotificationReset,
        Self::PasFirstNotification,
        Self::PasRenotifyNotification,
        Self::AlreadyEnrolled,
        Self::FirstConsentNotification,
        Self::ReconsentNotification,
        Self::GaGraduation,
        Self::RvcPostOta,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::ConsentNotificationDebug => DEBUG_CHANNEL,
            Self::ConsentNotificationReset => RESET_CHANNEL,
            Self::PasFirstNotification => "PAS_FIRST_NOTIFICATION_CHANNEL",
            Self::PasRenotifyNotification => "PAS_RENOTIFY_NOTIFICATION_CHANNEL",
            Self::AlreadyEnrolled => ALREADY_ENROLLED_CHANNEL,
            Self::FirstConsentNotification => FIRST_CONSENT_CHANNEL,
            Self::ReconsentNotification => "RECONSENT_NOTIFICATION_CHANNEL",
            Self::GaGraduation => "GA_GRADUATION_CHANNEL",
            Self::RvcPostOta => "RVC_POST_OTA_CHANNEL",
        }
    }

    fn is_eligible(&self, state: &ConsentState, flags: &dyn FlagState) -> bool {
        use NotificationKind::*;

        match self {
            Self::ConsentNotificationDebug => debug_mode(flags),
            Self::ConsentNotificationReset => unconsumed_reset_token(state, flags).is_some(),
            Self::PasFirstNotification => {
                pas_ux_enabled(flags, state.region)
                    && !state.was_displayed(Ga)
                    && !state.was_displayed(Pas)
                    && !state.was_displayed(U18)
            }
            Self::PasRenotifyNotification => {
                pas_ux_enabled(flags, state.region)
                    && state.was_displayed(Ga)
                    && !state.was_displayed(Pas)
            }
            Self::AlreadyEnrolled => state.was_displayed(Ga) || state.was_displayed(Pas),
            Self::FirstConsentNotification => !state.any_notification_displayed(),
            Self::ReconsentNotification => {
                !state.was_displayed(Ga)
                    && !state.was_displayed(U18)
                    && state.was_displayed(Beta)
                    && reconsent_allowed(state)
            }
            Self::GaGraduation => {
                flags.get_flag(KEY_GA_GRADUATION_CHANNEL_ENABLED)
                    && state.was_displayed(U18)
                    && !state.was_displayed(Ga)
            }
            Self::RvcPostOta => {
                flags.get_flag(KEY_RVC_NOTIFICATION_ENABLED)
                    && state.was_displayed(Rvc)
                    && !state.was_displayed(Ga)
            }
        }
    }

    fn handle_enrollment(&self, env: &EnrollmentEnv) -> crate::Result<()> {
        let kind = NotificationKind::Ga;
        match self {
            Self::ConsentNotificationDebug => {
                notify(env, kind, consent_notification(env, false), false)?;
            }
            Self::ConsentNotificationReset => {
                reset_and_notify(env, kind, consent_notification(env, false))?
            }
            Self::PasFirstNotification => {
                notify(env, NotificationKind::Pas, notification_v2(env, false), true)?;
            }
            Self::PasRenotifyNotification => {
                notify(env, NotificationKind::Pas, notification_v2(env, true), true)?;
            }
            Self::AlreadyEnrolled => {}
            Self::FirstConsentNotification | Self::GaGraduation => {
                notify(env, kind, consent_notification(env, false), true)?;
            }
            Self::ReconsentNotification => {
                notify(env, kind, consent_notification(env, true), true)?;
            }
            Self::RvcPostOta => {
                if notify(env, kind, consent_notification(env, false), true)? {
                    env.tasks.on_event(BackgroundTask::MigrateRvcConsent);
                }
            }
        }
        Ok(())
    }
}

/// Beta users are asked again if they consented, or if consent was revoked
/// without them ever touching the settings
fn reconsent_allowed(state: &ConsentState) -> bool {
    state.consent.is_given()
        || state.manual_interaction == ManualInteraction::NoManualInteractionsRecorded
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consent::{ApiConsent, ConsentStore, MemoryConsentStore, Region};
    use crate::flags::{
        StaticFlags, KEY_EEA_PAS_UX_ENABLED, KEY_IS_EEA_DEVICE_FEATURE_ENABLED,
    };
    use crate::testing::RecordingMonitor;
    use crate::ux::RequestStates;
    use rstest::*;

    fn displayed(kinds: &[NotificationKind]) -> ConsentState {
        let mut state = ConsentState::default();
        state.displayed.extend(kinds.iter().copied());
        state
    }

    #[rstest]
    #[case(ApiConsent::Given, ManualInteraction::ManualInteractionsRecorded, true)]
    #[case(ApiConsent::Revoked, ManualInteraction::NoManualInteractionsRecorded, true)]
    #[case(ApiConsent::Revoked, ManualInteraction::ManualInteractionsRecorded, false)]
    #[case(ApiConsent::Revoked, ManualInteraction::Unknown, false)]
    #[case(ApiConsent::Given, ManualInteraction::NoManualInteractionsRecorded, true)]
    #[case(ApiConsent::Given, ManualInteraction::Unknown, true)]
    #[case(ApiConsent::Unknown, ManualInteraction::NoManualInteractionsRecorded, true)]
    #[case(ApiConsent::Unknown, ManualInteraction::ManualInteractionsRecorded, false)]
    #[case(ApiConsent::Unknown, ManualInteraction::Unknown, false)]
    fn test_reconsent(
        #[case] consent: ApiConsent,
        #[case] manual: ManualInteraction,
        #[case] expected: bool,
    ) {
        let flags = StaticFlags::new();
        let mut state = displayed(&[NotificationKind::Beta]);
        state.consent = consent;
        state.manual_interaction = manual;
        assert_eq!(
            GaChannel::ReconsentNotification.is_eligible(&state, &flags),
            expected
        );

        state.displayed.insert(NotificationKind::U18);
        assert!(!GaChannel::ReconsentNotification.is_eligible(&state, &flags));
    }

    #[test]
    fn test_graduation() {
        let mut flags = StaticFlags::new();
        let state = displayed(&[NotificationKind::U18]);
        assert!(!GaChannel::GaGraduation.is_eligible(&state, &flags));
        flags.set(KEY_GA_GRADUATION_CHANNEL_ENABLED, true);
        assert!(GaChannel::GaGraduation.is_eligible(&state, &flags));
        let state = displayed(&[NotificationKind::U18, NotificationKind::Ga]);
        assert!(!GaChannel::GaGraduation.is_eligible(&state, &flags));
    }

    #[test]
    fn test_pas_channels() {
        let mut flags = StaticFlags::new();
        flags
            .set(KEY_EEA_PAS_UX_ENABLED, true)
            .set(KEY_IS_EEA_DEVICE_FEATURE_ENABLED, true);

        let mut state = ConsentState::default();
        state.region = Region::Eu;
        assert!(GaChannel::PasFirstNotification.is_eligible(&state, &flags));
        assert!(!GaChannel::PasRenotifyNotification.is_eligible(&state, &flags));

        state.displayed.insert(NotificationKind::Ga);
        assert!(!GaChannel::PasFirstNotification.is_eligible(&state, &flags));
        assert!(GaChannel::PasRenotifyNotification.is_eligible(&state, &flags));

        state.displayed.insert(NotificationKind::Pas);
        assert!(!GaChannel::PasRenotifyNotification.is_eligible(&state, &flags));
        assert!(GaChannel::AlreadyEnrolled.is_eligible(&state, &flags));

        // ROW devices need the ROW flag
        let mut state = ConsentState::default();
        state.region = Region::Row;
        assert!(!GaChannel::PasFirstNotification.is_eligible(&state, &flags));
    }

    #[test]
    fn test_rvc_post_ota_migrates_once() {
        let mut flags = StaticFlags::new();
        flags.set(KEY_RVC_NOTIFICATION_ENABLED, true);
        let store = MemoryConsentStore::with_state(displayed(&[NotificationKind::Rvc]));
        let tasks: RecordingMonitor<BackgroundTask> = RecordingMonitor::new();
        let request = RequestStates::builder().ad_id_enabled(true).build();
        let env = EnrollmentEnv {
            store: &store,
            flags: &flags,
            tasks: &tasks,
            request: &request,
        };

        let state = store.get().expect("state");
        assert!(GaChannel::RvcPostOta.is_eligible(&state, &flags));
        GaChannel::RvcPostOta
            .handle_enrollment(&env)
            .expect("handle");
        GaChannel::RvcPostOta
            .handle_enrollment(&env)
            .expect("handle again");
        assert_eq!(
            tasks.take(),
            vec![
                BackgroundTask::ScheduleConsentNotification {
                    ad_id_enabled: true,
                    reconsent: false,
                },
                BackgroundTask::MigrateRvcConsent,
            ]
        );
        assert!(store.get().expect("state").is_pending(NotificationKind::Ga));
    }

    #[test]
    fn test_reset() {
        let mut flags = StaticFlags::new();
        flags.set_string(
            crate::flags::KEY_CONSENT_NOTIFICATION_RESET_TOKEN,
            "token",
        );
        let store = MemoryConsentStore::with_state(displayed(&[
            NotificationKind::Ga,
            NotificationKind::Beta,
        ]));
        let tasks: RecordingMonitor<BackgroundTask> = RecordingMonitor::new();
        let request = RequestStates::default();
        let env = EnrollmentEnv {
            store: &store,
            flags: &flags,
            tasks: &tasks,
            request: &request,
        };

        let state = store.get().expect("state");
        assert!(GaChannel::ConsentNotificationReset.is_eligible(&state, &flags));
        GaChannel::ConsentNotificationReset
            .handle_enrollment(&env)
            .expect("reset");

        let state = store.get().expect("state");
        assert!(!state.any_notification_displayed());
        assert!(state.is_pending(NotificationKind::Ga));
        assert_eq!(state.reset_token.as_deref(), Some("token"));
        assert!(!GaChannel::ConsentNotificationReset.is_eligible(&state, &flags));
        assert_eq!(tasks.take().len(), 1);
    }
}
