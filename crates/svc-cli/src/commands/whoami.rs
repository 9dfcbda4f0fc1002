use crate::Context;

#[derive(Clone, Debug, clap::Parser)]
pub struct SelfIdCommand;

impl SelfIdCommand {
    pub fn exec(self, context: &Context) -> anyhow::Result<()> {
        println!("{}", context.client()?.self_id()?);
        Ok(())
    }
}

#[derive(Clone, Debug, clap::Parser)]
pub struct SelfLoginCommand;

impl SelfLoginCommand {
    pub fn exec(self, context: &Context) -> anyhow::Result<()> {
        println!("{}", context.client()?.self_login()?);
        Ok(())
    }
}
