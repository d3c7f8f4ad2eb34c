use clap::{self, Args};
use itertools::Itertools;

use uxengine::config::FlagValue;
use uxengine::flags::{known_flags, region_from_flags, KEY_CONSENT_NOTIFICATION_RESET_TOKEN};
use uxengine::{Context, FlagState};

use crate::parsers::FlagOverrideValueParser;
use crate::utils::load_flags;

#[derive(Args)]
pub struct Flags {
    /// Flag overrides as `key=value`, may be given multiple times
    #[arg(long = "flag", value_parser = FlagOverrideValueParser)]
    flags: Vec<(String, FlagValue)>,

    /// Only print the flags that are on
    #[arg(long, action = clap::ArgAction::SetTrue)]
    enabled_only: bool,
}

impl Flags {
    pub fn run(&self, ctx: &dyn Context) -> anyhow::Result<()> {
        let flags = load_flags(ctx, &self.flags)?;
        let width = known_flags()
            .chain(std::iter::once(KEY_CONSENT_NOTIFICATION_RESET_TOKEN))
            .map(str::len)
            .max()
            .unwrap_or(0);

        let lines = known_flags()
            .map(|key| (key, flags.get_flag(key)))
            .filter(|(_, on)| !self.enabled_only || *on)
            .map(|(key, on)| format!("{:width$} {}", key, on, width = width))
            .join("\n");
        if !lines.is_empty() {
            println!("{}", lines);
        }

        let token = flags.get_string(KEY_CONSENT_NOTIFICATION_RESET_TOKEN);
        if token.is_some() || !self.enabled_only {
            println!(
                "{:width$} {}",
                KEY_CONSENT_NOTIFICATION_RESET_TOKEN,
                token.as_deref().unwrap_or("unset"),
                width = width
            );
        }
        println!("region: {}", region_from_flags(&flags));
        Ok(())
    }
}
