#![forbid(unsafe_code)]

mod commands;
mod logger;
mod store;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use log::debug;
use svc_client::{Client, ClientBuilder, HttpTransport, StaticResolver};

use crate::{
    commands::{
        completions::CompletionsCommand, connect::ConnectCommand, login_as::LoginAsCommand,
        logout::LogoutCommand, request::RequestCommand, set_token::SetTokenCommand,
        url::UrlCommand,
        whoami::{SelfIdCommand, SelfLoginCommand},
    },
    store::Store,
};

#[derive(Parser)]
#[command(name = "svc")]
struct Cli {
    /// Name of the service, or its URL.
    #[clap(long, env = "SVC_SERVICE")]
    service: Option<String>,
    /// Use clean paths like `/self/id/` rather than routing through `?r=`.
    #[clap(long, env = "SVC_REWRITE", default_value_t = true, action = ArgAction::Set)]
    rewrite: bool,
    /// JSON file mapping service names to URLs.
    #[clap(long, env = "SVC_DIRECTORY")]
    directory: Option<PathBuf>,
    /// Location of the stored sessions.
    #[clap(long, env = "SVC_STATE")]
    state: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

/// The service that commands talk to and where its session is kept.
pub struct Context {
    service: String,
    rewrite: bool,
    directory: Option<PathBuf>,
    store: Store,
}

impl Context {
    fn resolver(&self) -> anyhow::Result<StaticResolver> {
        let file = match &self.directory {
            Some(file) => file.clone(),
            None => dirs::config_dir()
                .context("Could not infer a config directory")?
                .join("svc")
                .join("services.json"),
        };
        debug!("Reading service directory from {file:?}");
        StaticResolver::from_file(&file)
    }

    /// Create a client, restoring any session stored for the service.
    pub fn client(&self) -> anyhow::Result<Client<HttpTransport>> {
        let mut client = ClientBuilder::new(&self.service)
            .rewrite_mode(self.rewrite)
            .build(&self.resolver()?, HttpTransport::try_new()?)?;
        if let Some(session) = self.store.read_session(&self.service)? {
            if session.is_authenticated() {
                debug!("Restoring stored session for {}", self.service);
                client.set_token(session.token(), session.login())?;
            }
        }
        Ok(client)
    }

    pub fn save(&self, client: &Client<HttpTransport>) -> anyhow::Result<()> {
        self.store.write_session(&self.service, client.session())
    }

    pub fn forget(&self) -> anyhow::Result<bool> {
        self.store.forget_session(&self.service)
    }
}

impl Cli {
    pub fn exec(self) -> anyhow::Result<()> {
        let Self {
            service,
            rewrite,
            directory,
            state,
            command,
        } = self;
        let context = || -> anyhow::Result<Context> {
            Ok(Context {
                service: service
                    .clone()
                    .context("No service given, use --service or SVC_SERVICE")?,
                rewrite,
                directory: directory.clone(),
                store: Store::open_or_create(state.clone())?,
            })
        };
        match command {
            Commands::Connect(cmd) => cmd.exec(&context()?)?,
            Commands::SetToken(cmd) => cmd.exec(&context()?)?,
            Commands::Token => println!("{}", context()?.client()?.token()),
            Commands::SelfId(cmd) => cmd.exec(&context()?)?,
            Commands::SelfLogin(cmd) => cmd.exec(&context()?)?,
            Commands::LoginAs(cmd) => cmd.exec(&context()?)?,
            Commands::Request(cmd) => cmd.exec(&context()?)?,
            Commands::Url(cmd) => cmd.exec(&context()?)?,
            Commands::Logout(cmd) => cmd.exec(&context()?)?,
            Commands::Completions(cmd) => cmd.exec::<Self>()?,
        }
        Ok(())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with a login and password
    Connect(ConnectCommand),
    /// Use a token obtained elsewhere
    SetToken(SetTokenCommand),
    /// Print the stored token
    Token,
    /// Print the id of the authenticated user
    SelfId(SelfIdCommand),
    /// Print the login of the authenticated user
    SelfLogin(SelfLoginCommand),
    /// Act as another user
    LoginAs(LoginAsCommand),
    /// Send a request to an arbitrary endpoint and print the result
    Request(RequestCommand),
    /// Print the path of a locator without contacting the service
    Url(UrlCommand),
    /// Forget the stored session
    Logout(LogoutCommand),
    /// Print a completion file for the given shell.
    ///
    /// Example: `svc completions zsh | source /dev/stdin`.
    Completions(CompletionsCommand),
}

fn main() -> anyhow::Result<()> {
    let mut guard = logger::init()?;
    Cli::parse().exec()?;
    guard.disarm();
    Ok(())
}
