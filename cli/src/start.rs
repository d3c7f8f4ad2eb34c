use clap::{self, Args};
use serde::Serialize;

use uxengine::config::FlagValue;
use uxengine::{
    BackgroundTask, ChannelEventMonitor, Context, FanoutMonitor, LogMonitor, RequestStates,
    SelectionEngine, SelectionOutcome, UxEvent,
};

use crate::parsers::FlagOverrideValueParser;
use crate::utils::{load_flags, open_store};

#[derive(Args)]
pub struct Start {
    /// The ad id is available to the caller
    #[arg(long, action = clap::ArgAction::SetTrue)]
    ad_id_enabled: bool,

    /// The account is a known adult account
    #[arg(long, action = clap::ArgAction::SetTrue)]
    adult_account: bool,

    /// The account is a known U18 account
    #[arg(long, action = clap::ArgAction::SetTrue)]
    u18_account: bool,

    /// The Privacy Sandbox settings entry point is enabled
    #[arg(long, action = clap::ArgAction::SetTrue)]
    ui_enabled: bool,

    /// Only refresh the UX and channel for the entry point, no enrollment
    #[arg(long, action = clap::ArgAction::SetTrue)]
    probe: bool,

    /// Flag overrides as `key=value`, may be given multiple times
    #[arg(long = "flag", value_parser = FlagOverrideValueParser)]
    flags: Vec<(String, FlagValue)>,

    /// Print the result as JSON
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,
}

#[derive(Serialize)]
struct StartReport {
    request: RequestStates,
    #[serde(flatten)]
    outcome: SelectionOutcome,
    events: Vec<UxEvent>,
    tasks: Vec<BackgroundTask>,
}

impl Start {
    fn request(&self) -> RequestStates {
        RequestStates::builder()
            .ad_id_enabled(self.ad_id_enabled)
            .adult_account(self.adult_account)
            .u18_account(self.u18_account)
            .privacy_sandbox_ui_enabled(self.ui_enabled)
            .privacy_sandbox_ui_request(self.probe)
            .build()
    }

    pub fn run(&self, ctx: &dyn Context) -> anyhow::Result<()> {
        let store = open_store(ctx)?;
        let flags = load_flags(ctx, &self.flags)?;

        let (task_mon, task_rx) = ChannelEventMonitor::<BackgroundTask>::create_with_bound(64);
        let (event_mon, event_rx) = ChannelEventMonitor::<UxEvent>::create_with_bound(64);
        let events = FanoutMonitor::new()
            .with(LogMonitor::default())
            .with(event_mon);

        let request = self.request();
        let outcome = SelectionEngine::new(&store, &flags, &task_mon, &events).start(&request)?;

        let report = StartReport {
            request,
            outcome,
            events: event_rx.try_iter().collect(),
            tasks: task_rx.try_iter().collect(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        match report.outcome.channel() {
            Some(channel) => println!("{} {}", report.outcome.ux(), channel.as_str()),
            None => println!("{} <no enrollment channel>", report.outcome.ux()),
        }
        for evt in &report.events {
            println!("event: {}", evt);
        }
        for task in &report.tasks {
            println!("task: {}", task);
        }
        Ok(())
    }
}
