use std::fmt::{Display, Formatter};

use serde::Serialize;

use super::PrivacySandboxUx;
use crate::consent::{ApiType, ConsentState};
use crate::monitor::EventMonitor;

/// Work handed off to the task sink, the engine never waits on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BackgroundTask {
    ScheduleConsentNotification { ad_id_enabled: bool, reconsent: bool },
    /// The PAS notification
    ScheduleNotificationV2 { ad_id_enabled: bool, renotify: bool },
    EnablePackageChangedReceiver,
    ScheduleAllBackgroundJobs,
    ScheduleMeasurementBackgroundJobs,
    MigrateRvcConsent,
}

impl Display for BackgroundTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScheduleConsentNotification {
                ad_id_enabled,
                reconsent,
            } => write!(
                f,
                "schedule consent notification (ad id: {}, reconsent: {})",
                ad_id_enabled, reconsent
            ),
            Self::ScheduleNotificationV2 {
                ad_id_enabled,
                renotify,
            } => write!(
                f,
                "schedule PAS notification (ad id: {}, renotify: {})",
                ad_id_enabled, renotify
            ),
            Self::EnablePackageChangedReceiver => f.write_str("enable package changed receiver"),
            Self::ScheduleAllBackgroundJobs => f.write_str("schedule all background jobs"),
            Self::ScheduleMeasurementBackgroundJobs => {
                f.write_str("schedule measurement background jobs")
            }
            Self::MigrateRvcConsent => f.write_str("migrate RVC consent"),
        }
    }
}

/// The tasks to start once the user has consented under `ux`
pub fn background_tasks_upon_consent(
    ux: PrivacySandboxUx,
    state: &ConsentState,
) -> Vec<BackgroundTask> {
    let (consented, jobs) = match ux {
        PrivacySandboxUx::Ga | PrivacySandboxUx::Beta => {
            (state.consent.is_given(), BackgroundTask::ScheduleAllBackgroundJobs)
        }
        PrivacySandboxUx::U18 | PrivacySandboxUx::Rvc => (
            state.consent_for(ApiType::Measurement).is_given(),
            BackgroundTask::ScheduleMeasurementBackgroundJobs,
        ),
        PrivacySandboxUx::Unsupported => return Vec::new(),
    };
    if !consented {
        return Vec::new();
    }
    vec![BackgroundTask::EnablePackageChangedReceiver, jobs]
}

/// Submit [background_tasks_upon_consent] to the task sink
pub fn start_background_tasks_upon_consent(
    ux: PrivacySandboxUx,
    state: &ConsentState,
    tasks: &dyn EventMonitor<BackgroundTask>,
) {
    for task in background_tasks_upon_consent(ux, state) {
        tasks.on_event(task);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consent::ApiConsent;
    use rstest::*;

    #[rstest]
    #[case(PrivacySandboxUx::Ga, ApiConsent::Given, ApiConsent::Unknown, Some(BackgroundTask::ScheduleAllBackgroundJobs))]
    #[case(PrivacySandboxUx::Beta, ApiConsent::Given, ApiConsent::Unknown, Some(BackgroundTask::ScheduleAllBackgroundJobs))]
    #[case(PrivacySandboxUx::Ga, ApiConsent::Revoked, ApiConsent::Given, None)]
    #[case(PrivacySandboxUx::U18, ApiConsent::Revoked, ApiConsent::Given, Some(BackgroundTask::ScheduleMeasurementBackgroundJobs))]
    #[case(PrivacySandboxUx::Rvc, ApiConsent::Unknown, ApiConsent::Given, Some(BackgroundTask::ScheduleMeasurementBackgroundJobs))]
    #[case(PrivacySandboxUx::U18, ApiConsent::Given, ApiConsent::Revoked, None)]
    #[case(PrivacySandboxUx::Unsupported, ApiConsent::Given, ApiConsent::Given, None)]
    fn test_tasks_upon_consent(
        #[case] ux: PrivacySandboxUx,
        #[case] consent: ApiConsent,
        #[case] measurement: ApiConsent,
        #[case] jobs: Option<BackgroundTask>,
    ) {
        let mut state = ConsentState::default();
        state.consent = consent;
        state.measurement_consent = measurement;

        let expected = match jobs {
            Some(jobs) => vec![BackgroundTask::EnablePackageChangedReceiver, jobs],
            None => Vec::new(),
        };
        assert_eq!(background_tasks_upon_consent(ux, &state), expected);
    }
}
