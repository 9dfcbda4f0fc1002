use crate::Context;

#[derive(Clone, Debug, clap::Parser)]
pub struct SetTokenCommand {
    token: String,
    /// Login the token belongs to, if known.
    #[arg(long, default_value = "")]
    login: String,
}

impl SetTokenCommand {
    pub fn exec(self, context: &Context) -> anyhow::Result<()> {
        let mut client = context.client()?;
        client.set_token(&self.token, &self.login)?;
        context.save(&client)
    }
}
