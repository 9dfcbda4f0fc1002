//! Utilities for keeping sessions across invocations.
use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{anyhow, Context};
use log::debug;
use svc_client::Session;

const SESSIONS_FILE_NAME: &str = "sessions.json";

/// Sessions keyed by the service they belong to, as given on the command line.
pub struct Store(PathBuf);

impl Store {
    pub fn open_or_create(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let dir = match data_dir {
            None => dirs::data_dir()
                .context("Could not infer a data directory")?
                .join("svc"),
            Some(custom) => custom,
        };
        fs::create_dir_all(&dir).context("Failed to create the data directory")?;
        Ok(Self(dir))
    }

    fn read_sessions(&self) -> anyhow::Result<HashMap<String, Session>> {
        let file = self.0.join(SESSIONS_FILE_NAME);
        match fs::read_to_string(&file) {
            Ok(t) => serde_json::from_str(&t)
                .context("Failed to deserialize sessions")
                .with_context(|| format!("Consider removing {file:?}")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{SESSIONS_FILE_NAME} not found, returning an empty collection");
                Ok(HashMap::new())
            }
            Err(e) => Err(anyhow!(e)),
        }
    }

    fn write_sessions(&self, sessions: &HashMap<String, Session>) -> anyhow::Result<()> {
        let sessions =
            serde_json::to_string_pretty(sessions).context("Failed to serialize sessions")?;
        fs::write(self.0.join(SESSIONS_FILE_NAME), sessions).context("Failed to write sessions")
    }

    pub fn read_session(&self, service: &str) -> anyhow::Result<Option<Session>> {
        Ok(self.read_sessions()?.remove(service))
    }

    pub fn write_session(&self, service: &str, session: &Session) -> anyhow::Result<()> {
        let mut sessions = self.read_sessions()?;
        sessions.insert(service.to_string(), session.clone());
        self.write_sessions(&sessions)
    }

    /// Returns `true` if there was a session to forget.
    pub fn forget_session(&self, service: &str) -> anyhow::Result<bool> {
        let mut sessions = self.read_sessions()?;
        let removed = sessions.remove(service).is_some();
        if removed {
            self.write_sessions(&sessions)?;
        }
        Ok(removed)
    }
}
