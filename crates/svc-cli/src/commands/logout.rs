use log::{info, warn};

use crate::Context;

#[derive(Clone, Debug, clap::Parser)]
pub struct LogoutCommand;

impl LogoutCommand {
    pub fn exec(self, context: &Context) -> anyhow::Result<()> {
        if context.forget()? {
            info!("Forgot stored session");
        } else {
            warn!("No session was stored");
        }
        Ok(())
    }
}
