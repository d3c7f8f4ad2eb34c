use clap::Args;
use itertools::Itertools;

use uxengine::PrivacySandboxUx;

#[derive(Args)]
pub struct Uxes {}

impl Uxes {
    pub fn run(&self) -> anyhow::Result<()> {
        for ux in PrivacySandboxUx::ALL {
            let channels = ux.channels().iter().map(|it| it.as_str()).join(", ");
            println!("{}: [{}]", ux, channels);
        }
        Ok(())
    }
}
