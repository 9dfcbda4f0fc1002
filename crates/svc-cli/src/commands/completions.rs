use clap_complete::{generate, Shell};

#[derive(Clone, Debug, clap::Parser)]
pub struct CompletionsCommand {
    shell: Shell,
}

impl CompletionsCommand {
    pub fn exec<T: clap::CommandFactory>(self) -> anyhow::Result<()> {
        let mut cmd = T::command();
        let name = cmd.get_name().to_string();
        generate(self.shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}
