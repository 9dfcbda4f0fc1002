use crate::Context;

#[derive(Clone, Debug, clap::Parser)]
pub struct UrlCommand {
    /// Symbolic name of the endpoint, e.g. `selfId`.
    locator: String,
}

impl UrlCommand {
    pub fn exec(self, context: &Context) -> anyhow::Result<()> {
        println!("{}", context.client()?.get_request_url(&self.locator)?);
        Ok(())
    }
}
