use clap::{self, Args};

use uxengine::{ConsentStore, Context};

use crate::utils::{open_store, write_state};

#[derive(Args)]
pub struct Show {
    /// Print the state as JSON
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,
}

impl Show {
    pub fn run(&self, ctx: &dyn Context) -> anyhow::Result<()> {
        let store = open_store(ctx)?;
        let state = store.get()?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else {
            write_state(&mut std::io::stdout().lock(), &state)?;
        }
        Ok(())
    }
}
