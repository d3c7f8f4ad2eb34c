use serde::Serialize;

/// Snapshot of the caller supplied state for one selection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestStates {
    pub ad_id_enabled: bool,
    pub adult_account: bool,
    pub u18_account: bool,
    pub privacy_sandbox_ui_enabled: bool,
    /// The request only refreshes the UX and channel for the entry point
    pub privacy_sandbox_ui_request: bool,
}

impl RequestStates {
    pub fn builder() -> RequestStatesBuilder {
        RequestStatesBuilder::default()
    }
}

/// Builder for [RequestStates], anything not set is `false`
#[derive(Default)]
pub struct RequestStatesBuilder {
    inner: RequestStates,
}

impl RequestStatesBuilder {
    pub fn ad_id_enabled(mut self, value: bool) -> Self {
        self.inner.ad_id_enabled = value;
        self
    }

    pub fn adult_account(mut self, value: bool) -> Self {
        self.inner.adult_account = value;
        self
    }

    pub fn u18_account(mut self, value: bool) -> Self {
        self.inner.u18_account = value;
        self
    }

    pub fn privacy_sandbox_ui_enabled(mut self, value: bool) -> Self {
        self.inner.privacy_sandbox_ui_enabled = value;
        self
    }

    pub fn privacy_sandbox_ui_request(mut self, value: bool) -> Self {
        self.inner.privacy_sandbox_ui_request = value;
        self
    }

    pub fn build(self) -> RequestStates {
        self.inner
    }
}
