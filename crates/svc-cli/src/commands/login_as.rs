use anyhow::Context as _;

use crate::Context;

#[derive(Clone, Debug, clap::Parser)]
pub struct LoginAsCommand {
    user: String,
    /// What `user` is; anything but `id` is sent to the service as is, e.g. `login`.
    #[arg(long, default_value = "id")]
    field: String,
}

impl LoginAsCommand {
    pub fn exec(self, context: &Context) -> anyhow::Result<()> {
        let Self { user, field } = self;
        let mut client = context.client()?;
        client
            .login_as(&user, &field)
            .with_context(|| format!("Failed to login as {user} by {field}"))?;
        context.save(&client)
    }
}
