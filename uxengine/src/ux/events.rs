use std::fmt::{Display, Formatter};

use serde::Serialize;

use super::{EnrollmentChannel, PrivacySandboxUx};

/// Observability events emitted by [crate::SelectionEngine]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UxEvent {
    EntryPointClicked {
        ux: PrivacySandboxUx,
        channel: EnrollmentChannel,
    },
    NoEnrollmentChannel {
        ux: PrivacySandboxUx,
    },
    EnrollmentChannelInvoked {
        ux: PrivacySandboxUx,
        channel: EnrollmentChannel,
    },
}

impl Display for UxEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryPointClicked { ux, channel } => {
                write!(f, "entry point clicked ({} / {})", ux, channel.as_str())
            }
            Self::NoEnrollmentChannel { ux } => {
                write!(f, "no enrollment channel available for {}", ux)
            }
            Self::EnrollmentChannelInvoked { ux, channel } => {
                write!(f, "enrollment channel invoked ({} / {})", ux, channel.as_str())
            }
        }
    }
}
