use std::io::{self, IsTerminal};

use anyhow::Context as _;
use log::info;

use crate::Context;

#[derive(Clone, Debug, clap::Parser)]
pub struct ConnectCommand {
    login: String,
    /// Password to authenticate with; read from stdin if omitted.
    #[arg(long, env = "SVC_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

fn input(prompt: &str) -> anyhow::Result<String> {
    if io::stdin().is_terminal() {
        println!("{prompt}");
    }
    let mut buf = String::new();
    io::stdin()
        .read_line(&mut buf)
        .context("Failed to read from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

impl ConnectCommand {
    pub fn exec(self, context: &Context) -> anyhow::Result<()> {
        let Self { login, password } = self;
        let password = match password {
            Some(p) => p,
            None => input("Enter the password:")?,
        };
        let mut client = context.client()?;
        client
            .connect(&login, &password)
            .with_context(|| format!("Failed to connect as {login}"))?;
        info!("Connected as {login}");
        context.save(&client)
    }
}
