use serde::Serialize;

use super::background::start_background_tasks_upon_consent;
use super::channel::EnrollmentEnv;
use super::select::{select_channel, select_ux};
use super::{BackgroundTask, EnrollmentChannel, PrivacySandboxUx, RequestStates, UxEvent};
use crate::consent::ConsentStore;
use crate::flags::{region_from_flags, FlagState};
use crate::monitor::EventMonitor;

/// Result of a single [SelectionEngine::start] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome")]
pub enum SelectionOutcome {
    /// The channel's enrollment action ran
    Enrolled {
        ux: PrivacySandboxUx,
        channel: EnrollmentChannel,
    },
    /// Entry point probe, the UX and channel were refreshed only
    EntryPointRefreshed {
        ux: PrivacySandboxUx,
        channel: EnrollmentChannel,
    },
    /// No channel of the selected UX is eligible, nothing was stored
    NoEnrollmentChannel { ux: PrivacySandboxUx },
}

impl SelectionOutcome {
    pub fn ux(&self) -> PrivacySandboxUx {
        match self {
            Self::Enrolled { ux, .. }
            | Self::EntryPointRefreshed { ux, .. }
            | Self::NoEnrollmentChannel { ux } => *ux,
        }
    }

    pub fn channel(&self) -> Option<EnrollmentChannel> {
        match self {
            Self::Enrolled { channel, .. } | Self::EntryPointRefreshed { channel, .. } => {
                Some(*channel)
            }
            Self::NoEnrollmentChannel { .. } => None,
        }
    }
}

/// Picks the UX and enrollment channel for a request and runs the enrollment.
///
/// All collaborators are borrowed so the embedder decides their lifetime and
/// sharing. Calls run on the caller's thread, the store serializes writes.
pub struct SelectionEngine<'a> {
    store: &'a dyn ConsentStore,
    flags: &'a dyn FlagState,
    tasks: &'a dyn EventMonitor<BackgroundTask>,
    monitor: &'a dyn EventMonitor<UxEvent>,
}

impl<'a> SelectionEngine<'a> {
    pub fn new(
        store: &'a dyn ConsentStore,
        flags: &'a dyn FlagState,
        tasks: &'a dyn EventMonitor<BackgroundTask>,
        monitor: &'a dyn EventMonitor<UxEvent>,
    ) -> Self {
        Self {
            store,
            flags,
            tasks,
            monitor,
        }
    }

    pub fn start(&self, request: &RequestStates) -> crate::Result<SelectionOutcome> {
        let region = region_from_flags(self.flags);
        let state = self.store.persist_request_states(request, region)?;

        let ux = select_ux(&state, self.flags);
        let channel = match select_channel(ux, &state, self.flags) {
            Some(v) => v,
            None => {
                log::info!("no enrollment channel available for {}", ux);
                self.monitor.on_event(UxEvent::NoEnrollmentChannel { ux });
                return Ok(SelectionOutcome::NoEnrollmentChannel { ux });
            }
        };

        log::info!("selected {} with channel {}", ux, channel.as_str());
        self.store.set_ux_and_channel(ux, channel)?;

        if request.privacy_sandbox_ui_request {
            self.monitor
                .on_event(UxEvent::EntryPointClicked { ux, channel });
            return Ok(SelectionOutcome::EntryPointRefreshed { ux, channel });
        }

        self.monitor
            .on_event(UxEvent::EnrollmentChannelInvoked { ux, channel });
        let env = EnrollmentEnv {
            store: self.store,
            flags: self.flags,
            tasks: self.tasks,
            request,
        };
        channel.handle_enrollment(&env)?;

        let state = self.store.get()?;
        start_background_tasks_upon_consent(ux, &state, self.tasks);

        Ok(SelectionOutcome::Enrolled { ux, channel })
    }
}
