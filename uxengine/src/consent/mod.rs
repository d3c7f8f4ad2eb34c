//! Durable consent state and the stores that hold it.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ux::{EnrollmentChannel, PrivacySandboxUx, RequestStates};

mod store;
pub use store::{ConsentStore, FileConsentStore, MemoryConsentStore};

/// Device region as classified from the flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Region {
    Eu,
    #[default]
    Row,
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Eu => "eu",
            Self::Row => "row",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ApiConsent {
    Given,
    Revoked,
    #[default]
    Unknown,
}

impl ApiConsent {
    pub fn is_given(&self) -> bool {
        matches!(self, Self::Given)
    }

    pub fn from_bool(given: bool) -> Self {
        if given {
            Self::Given
        } else {
            Self::Revoked
        }
    }
}

impl Display for ApiConsent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Given => "given",
            Self::Revoked => "revoked",
            Self::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiType {
    Topics,
    Fledge,
    Measurement,
}

impl ApiType {
    pub const ALL: [ApiType; 3] = [Self::Topics, Self::Fledge, Self::Measurement];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topics => "topics",
            Self::Fledge => "fledge",
            Self::Measurement => "measurement",
        }
    }
}

impl Display for ApiType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|it| it.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| crate::Error::Generic(format!("invalid api type: {}", s)))
    }
}

/// Whether the user has ever touched the consent settings by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ManualInteraction {
    #[default]
    Unknown,
    NoManualInteractionsRecorded,
    ManualInteractionsRecorded,
}

/// The notifications that leave a "displayed" marker behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Beta,
    Ga,
    U18,
    Rvc,
    Pas,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 5] = [Self::Beta, Self::Ga, Self::U18, Self::Rvc, Self::Pas];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beta => "beta",
            Self::Ga => "ga",
            Self::U18 => "u18",
            Self::Rvc => "rvc",
            Self::Pas => "pas",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|it| it.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| crate::Error::Generic(format!("invalid notification kind: {}", s)))
    }
}

/// Everything the engine remembers between calls.
///
/// `ux` and `enrollment_channel` are only ever overwritten by a later
/// selection that finds a channel, or cleared by an explicit reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsentState {
    pub ux: Option<PrivacySandboxUx>,
    pub enrollment_channel: Option<EnrollmentChannel>,

    /// Legacy single consent covering every API
    pub consent: ApiConsent,
    pub topics_consent: ApiConsent,
    pub fledge_consent: ApiConsent,
    pub measurement_consent: ApiConsent,

    pub region: Region,
    pub manual_interaction: ManualInteraction,

    pub ad_id_enabled: bool,
    pub adult_account: bool,
    pub u18_account: bool,
    pub entry_point_enabled: bool,

    pub displayed: BTreeSet<NotificationKind>,
    pub pending: BTreeSet<NotificationKind>,

    /// Last consumed `consent_notification_reset_token`
    pub reset_token: Option<String>,
}

impl ConsentState {
    pub fn was_displayed(&self, kind: NotificationKind) -> bool {
        self.displayed.contains(&kind)
    }

    pub fn any_notification_displayed(&self) -> bool {
        !self.displayed.is_empty()
    }

    pub fn is_pending(&self, kind: NotificationKind) -> bool {
        self.pending.contains(&kind)
    }

    pub fn consent_for(&self, api: ApiType) -> ApiConsent {
        match api {
            ApiType::Topics => self.topics_consent,
            ApiType::Fledge => self.fledge_consent,
            ApiType::Measurement => self.measurement_consent,
        }
    }

    pub fn is_any_consent_given(&self) -> bool {
        self.consent.is_given() || ApiType::ALL.iter().any(|api| self.consent_for(*api).is_given())
    }

    pub(crate) fn set_consent_for(&mut self, api: ApiType, consent: ApiConsent) {
        match api {
            ApiType::Topics => self.topics_consent = consent,
            ApiType::Fledge => self.fledge_consent = consent,
            ApiType::Measurement => self.measurement_consent = consent,
        }
    }

    /// Legacy consent follows the per API consents: given if any API is given
    pub(crate) fn sync_legacy_consent(&mut self) {
        let any = ApiType::ALL
            .iter()
            .any(|it| self.consent_for(*it).is_given());
        self.consent = ApiConsent::from_bool(any);
    }

    /// PAS users that already opted into fledge or measurement, or touched
    /// the settings, keep their consents when renotified
    fn is_pas_renotify_user(&self) -> bool {
        self.fledge_consent.is_given()
            || self.measurement_consent.is_given()
            || self.manual_interaction == ManualInteraction::ManualInteractionsRecorded
    }

    /// Showing a notification moves its marker from pending to displayed,
    /// starts manual interaction tracking and sets up the default consents
    /// for the region.
    pub(crate) fn apply_notification_displayed(&mut self, kind: NotificationKind) {
        let keep_consents = kind == NotificationKind::Pas && self.is_pas_renotify_user();

        if self.manual_interaction != ManualInteraction::ManualInteractionsRecorded {
            self.manual_interaction = ManualInteraction::NoManualInteractionsRecorded;
        }
        self.pending.remove(&kind);
        self.displayed.insert(kind);

        let row = ApiConsent::from_bool(self.region == Region::Row);
        match kind {
            NotificationKind::Beta => self.consent = row,
            NotificationKind::U18 => {
                self.measurement_consent = ApiConsent::Given;
                self.sync_legacy_consent();
            }
            NotificationKind::Pas if keep_consents => {}
            NotificationKind::Ga | NotificationKind::Pas | NotificationKind::Rvc => {
                for api in ApiType::ALL {
                    self.set_consent_for(api, row);
                }
                self.sync_legacy_consent();
            }
        }
    }

    pub(crate) fn apply_request(&mut self, request: &RequestStates, region: Region) {
        self.ad_id_enabled = request.ad_id_enabled;
        self.adult_account = request.adult_account;
        self.u18_account = request.u18_account;
        self.entry_point_enabled = request.privacy_sandbox_ui_enabled;
        self.region = region;
    }
}
