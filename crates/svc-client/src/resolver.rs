//! Facilities for turning service names into base URLs.
use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Context};
use log::debug;

/// A directory of services.
pub trait Resolver {
    /// Return the base URL of `name`, if the service is known.
    fn resolve(&self, name: &str) -> Option<String>;

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

/// A directory that knows no services, so clients must be given URLs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve(&self, _: &str) -> Option<String> {
        None
    }
}

/// An in-memory directory of services.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct StaticResolver(HashMap<String, String>);

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_service(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.0.insert(name.into(), url.into());
    }

    pub fn with_service(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.set_service(name, url);
        self
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Read a directory stored as a JSON object mapping names to URLs.
    ///
    /// A missing file is treated as an empty directory.
    pub fn from_file(file: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(file) {
            Ok(t) => serde_json::from_str(&t)
                .context("Failed to deserialize service directory")
                .with_context(|| format!("Consider fixing {file:?}")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{file:?} not found, using an empty service directory");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow!(e)),
        }
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

impl<T: Resolver + ?Sized> Resolver for &T {
    fn resolve(&self, name: &str) -> Option<String> {
        (**self).resolve(name)
    }
}
