use std::io::Write;

use anyhow::Context as AnyhowContext;
use itertools::Itertools;

use uxengine::config::FlagValue;
use uxengine::{ConsentState, Context, FileConsentStore, UxFlags};

pub fn open_store(ctx: &dyn Context) -> anyhow::Result<FileConsentStore> {
    let store = FileConsentStore::from_context(ctx).with_context(|| "locating consent state")?;
    log::debug!("using consent state at {:?}", store.get_path());
    Ok(store)
}

pub fn load_flags(
    ctx: &dyn Context,
    overrides: &[(String, FlagValue)],
) -> anyhow::Result<UxFlags> {
    let flags = UxFlags::from_context(ctx)
        .with_context(|| "loading flags")?
        .with_overrides(overrides.iter().cloned());
    Ok(flags)
}

fn or_unset<T: ToString>(value: Option<T>) -> String {
    value
        .map(|it| it.to_string())
        .unwrap_or_else(|| String::from("unset"))
}

/// Human readable dump of the consent state
pub fn write_state<W: Write>(to: &mut W, state: &ConsentState) -> anyhow::Result<()> {
    writeln!(to, "ux:                 {}", or_unset(state.ux))?;
    writeln!(
        to,
        "enrollment channel: {}",
        or_unset(state.enrollment_channel.map(|it| it.as_str()))
    )?;
    writeln!(to, "consent:            {}", state.consent)?;
    writeln!(to, "  topics:           {}", state.topics_consent)?;
    writeln!(to, "  fledge:           {}", state.fledge_consent)?;
    writeln!(to, "  measurement:      {}", state.measurement_consent)?;
    writeln!(to, "manual interaction: {:?}", state.manual_interaction)?;
    writeln!(to, "region:             {}", state.region)?;
    writeln!(to, "ad id enabled:      {}", state.ad_id_enabled)?;
    writeln!(to, "adult account:      {}", state.adult_account)?;
    writeln!(to, "u18 account:        {}", state.u18_account)?;
    writeln!(to, "entry point:        {}", state.entry_point_enabled)?;
    writeln!(to, "displayed:          [{}]", state.displayed.iter().join(", "))?;
    writeln!(to, "pending:            [{}]", state.pending.iter().join(", "))?;
    writeln!(to, "reset token:        {}", or_unset(state.reset_token.as_deref()))?;
    Ok(())
}
