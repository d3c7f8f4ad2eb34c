use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use blanket::blanket;
use tempfile::NamedTempFile;

use super::{ApiConsent, ApiType, ConsentState, ManualInteraction, NotificationKind, Region};
use crate::utils::{ensure_dir_exists, maybe_read_file};
use crate::ux::{EnrollmentChannel, PrivacySandboxUx, RequestStates};
use crate::{Context, Error};

/// Narrow interface to the durable consent state.
///
/// [ConsentStore::update] is the critical section: implementations must run
/// the closure as a single read-modify-write under their lock and return the
/// state that was written. Everything else is built on top of it.
#[blanket(derive(Ref, Box, Arc))]
pub trait ConsentStore: Send + Sync {
    fn get(&self) -> crate::Result<ConsentState>;

    fn update(&self, f: &mut dyn FnMut(&mut ConsentState)) -> crate::Result<ConsentState>;

    /// Record the request derived flags and the device region
    fn persist_request_states(
        &self,
        request: &RequestStates,
        region: Region,
    ) -> crate::Result<ConsentState> {
        self.update(&mut |state| state.apply_request(request, region))
    }

    fn set_ux_and_channel(
        &self,
        ux: PrivacySandboxUx,
        channel: EnrollmentChannel,
    ) -> crate::Result<ConsentState> {
        self.update(&mut |state| {
            state.ux = Some(ux);
            state.enrollment_channel = Some(channel);
        })
    }

    /// A user consent action, `None` applies to every API
    fn record_user_consent(&self, api: Option<ApiType>, given: bool) -> crate::Result<ConsentState> {
        let consent = ApiConsent::from_bool(given);
        self.update(&mut |state| {
            match api {
                Some(api) => {
                    state.set_consent_for(api, consent);
                    state.sync_legacy_consent();
                }
                None => {
                    for it in ApiType::ALL {
                        state.set_consent_for(it, consent);
                    }
                    state.consent = consent;
                }
            }
            state.manual_interaction = ManualInteraction::ManualInteractionsRecorded;
        })
    }

    /// The notification was actually shown to the user, see
    /// [ConsentState::apply_notification_displayed]
    fn record_notification_displayed(&self, kind: NotificationKind) -> crate::Result<ConsentState> {
        self.update(&mut |state| state.apply_notification_displayed(kind))
    }

    /// Explicit reset back to the initial state
    fn reset(&self) -> crate::Result<ConsentState> {
        self.update(&mut |state| *state = ConsentState::default())
    }
}

/// Keeps the state in memory only
#[derive(Default)]
pub struct MemoryConsentStore {
    state: Mutex<ConsentState>,
}

impl MemoryConsentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ConsentState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl ConsentStore for MemoryConsentStore {
    fn get(&self) -> crate::Result<ConsentState> {
        let state = self
            .state
            .lock()
            .map_err(|_| Error::new_store("poisoned lock"))?;
        Ok(state.clone())
    }

    fn update(&self, f: &mut dyn FnMut(&mut ConsentState)) -> crate::Result<ConsentState> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::new_store("poisoned lock"))?;
        f(&mut state);
        Ok(state.clone())
    }
}

/// Keeps the state in a JSON file.
///
/// A missing file is the initial state. Writes go through a temporary file in
/// the same directory that is then renamed over the real one.
pub struct FileConsentStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileConsentStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Use the state file configured for the context
    pub fn from_context(ctx: &dyn Context) -> crate::Result<Self> {
        Ok(Self::new(ctx.get_state_file()?))
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    fn store_err<E: ToString + ?Sized>(&self, action: &str, err: &E) -> Error {
        Error::new_store(&format!(
            "{} {}: {}",
            action,
            self.path.display(),
            err.to_string()
        ))
    }

    fn load(&self) -> crate::Result<ConsentState> {
        let content = match maybe_read_file(&self.path) {
            Ok(Some(v)) => v,
            Ok(None) => {
                log::trace!("no consent state at {:?}, using initial state", self.path);
                return Ok(ConsentState::default());
            }
            Err(e) => return Err(self.store_err("reading", &e)),
        };
        serde_json::from_str(&content).map_err(|e| self.store_err("parsing", &e))
    }

    fn save(&self, state: &ConsentState) -> crate::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        ensure_dir_exists(dir).map_err(|e| self.store_err("creating directory for", &e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.store_err("writing", &e))?;
        serde_json::to_writer_pretty(&mut tmp, state)
            .map_err(|e| self.store_err("serializing", &e))?;
        tmp.flush().map_err(|e| self.store_err("writing", &e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.store_err("replacing", &e.error))?;
        Ok(())
    }
}

impl ConsentStore for FileConsentStore {
    fn get(&self) -> crate::Result<ConsentState> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::new_store("poisoned lock"))?;
        self.load()
    }

    fn update(&self, f: &mut dyn FnMut(&mut ConsentState)) -> crate::Result<ConsentState> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::new_store("poisoned lock"))?;
        let mut state = self.load()?;
        f(&mut state);
        self.save(&state)?;
        log::trace!("wrote consent state to {:?}", self.path);
        Ok(state)
    }
}
