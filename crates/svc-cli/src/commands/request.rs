use anyhow::Context as _;
use serde_json::{Map, Value};
use svc_client::reqwest::Method;

use crate::Context;

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[derive(Clone, Debug, clap::Parser)]
pub struct RequestCommand {
    #[arg(long, value_enum, default_value_t = HttpMethod::Get)]
    method: HttpMethod,
    /// Path relative to the service URL, e.g. `/users/` or `?r=users`.
    endpoint: String,
    /// JSON object to send; ignored for GET.
    #[arg(long)]
    data: Option<String>,
}

impl RequestCommand {
    pub fn exec(self, context: &Context) -> anyhow::Result<()> {
        let Self {
            method,
            endpoint,
            data,
        } = self;
        let data = match (method, data) {
            (HttpMethod::Get, _) => None,
            (_, Some(d)) => Some(serde_json::from_str(&d).context("Data is not valid JSON")?),
            (_, None) => Some(Value::Object(Map::new())),
        };
        let result = context
            .client()?
            .request(method.into(), &endpoint, data.as_ref())?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}
