use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::channel::{
    BetaChannel, ChannelCandidate, EnrollmentChannel, GaChannel, RvcChannel, U18Channel,
};
use crate::consent::{ConsentState, NotificationKind};
use crate::flags::{
    FlagState, KEY_ADSERVICES_ENABLED, KEY_GA_UX_FEATURE_ENABLED, KEY_RVC_UX_ENABLED,
    KEY_U18_UX_ENABLED,
};

/// The consent notification experiences, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrivacySandboxUx {
    Unsupported,
    U18,
    Rvc,
    Ga,
    Beta,
}

impl PrivacySandboxUx {
    /// Narrower experiences come before broader ones, the first eligible wins
    pub const ALL: [PrivacySandboxUx; 5] =
        [Self::Unsupported, Self::U18, Self::Rvc, Self::Ga, Self::Beta];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsupported => "UNSUPPORTED_UX",
            Self::U18 => "U18_UX",
            Self::Rvc => "RVC_UX",
            Self::Ga => "GA_UX",
            Self::Beta => "BETA_UX",
        }
    }

    pub fn is_eligible(&self, state: &ConsentState, flags: &dyn FlagState) -> bool {
        match self {
            Self::Unsupported => {
                !flags.get_flag(KEY_ADSERVICES_ENABLED) || !state.entry_point_enabled
            }
            Self::U18 => flags.get_flag(KEY_U18_UX_ENABLED) && state.u18_account,
            Self::Rvc => flags.get_flag(KEY_RVC_UX_ENABLED),
            Self::Ga => flags.get_flag(KEY_GA_UX_FEATURE_ENABLED) && state.adult_account,
            Self::Beta => !flags.get_flag(KEY_GA_UX_FEATURE_ENABLED) && state.adult_account,
        }
    }

    /// The candidate enrollment channels, in precedence order
    pub fn channels(&self) -> Vec<EnrollmentChannel> {
        match self {
            Self::Unsupported => Vec::new(),
            Self::U18 => U18Channel::ALL.iter().map(|c| EnrollmentChannel::U18(*c)).collect(),
            Self::Rvc => RvcChannel::ALL.iter().map(|c| EnrollmentChannel::Rvc(*c)).collect(),
            Self::Ga => GaChannel::ALL.iter().map(|c| EnrollmentChannel::Ga(*c)).collect(),
            Self::Beta => BetaChannel::ALL
                .iter()
                .map(|c| EnrollmentChannel::Beta(*c))
                .collect(),
        }
    }

    /// Marker left behind once this experience's notification was shown
    pub fn notification_kind(&self) -> Option<NotificationKind> {
        match self {
            Self::Unsupported => None,
            Self::U18 => Some(NotificationKind::U18),
            Self::Rvc => Some(NotificationKind::Rvc),
            Self::Ga => Some(NotificationKind::Ga),
            Self::Beta => Some(NotificationKind::Beta),
        }
    }
}

impl Display for PrivacySandboxUx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacySandboxUx {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .iter()
            .find(|it| it.as_str() == upper || it.as_str().trim_end_matches("_UX") == upper)
            .copied()
            .ok_or_else(|| crate::Error::Generic(format!("invalid ux: {}", s)))
    }
}
