use clap::Args;

use itertools::Itertools;
use uxengine::{ConsentStore, Context, NotificationKind};

use crate::utils::open_store;

#[derive(Args)]
pub struct Displayed {
    /// The notification that was shown: beta, ga, u18, rvc or pas
    #[arg(short, long)]
    kind: NotificationKind,
}

impl Displayed {
    pub fn run(&self, ctx: &dyn Context) -> anyhow::Result<()> {
        let store = open_store(ctx)?;
        let state = store.record_notification_displayed(self.kind)?;
        println!("displayed: [{}]", state.displayed.iter().join(", "));
        if !state.pending.is_empty() {
            println!("pending:   [{}]", state.pending.iter().join(", "));
        }
        Ok(())
    }
}
