use clap::Args;

use uxengine::{ConsentStore, Context};

use crate::utils::open_store;

#[derive(Args)]
pub struct Reset {}

impl Reset {
    pub fn run(&self, ctx: &dyn Context) -> anyhow::Result<()> {
        let store = open_store(ctx)?;
        store.reset()?;
        log::info!("consent state at {:?} reset", store.get_path());
        println!("consent state reset");
        Ok(())
    }
}
