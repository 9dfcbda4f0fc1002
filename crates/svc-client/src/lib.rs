//! A client for REST services that authenticate with a session token.
//!
//! A [`Client`] is bound to one service, given either as a name looked up through a
//! [`Resolver`] or directly as a URL. Requests go through a [`Transport`] and every response is
//! decoded by [`dispatch::dispatch`] before it reaches the caller.
pub mod client;
pub mod dispatch;
pub mod error;
pub mod locator;
pub mod resolver;
pub mod session;
pub mod transport;

pub use reqwest;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use locator::Locators;
pub use resolver::{NoResolver, Resolver, StaticResolver};
pub use session::Session;
pub use transport::{HttpTransport, Transport};
