//! JS soroban client driven through `node`
//!
//! Each call renders a small script from a template and feeds it to `node`
//! on stdin. Values are injected with `json_encode` so every string lands in
//! the script as a valid JS literal.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tera::{Context as TeraContext, Tera};

use crate::common::{Config, Error, Result};
use crate::process::ToolCommand;

use super::{parse_events, response_text, run_checked, ContractTool, EventQuery, Invocation, Profile};

const INVOKE_TEMPLATE: &str = include_str!("../../assets/invoke.js.tera");
const EVENTS_TEMPLATE: &str = include_str!("../../assets/events.js.tera");

/// Polls the script makes for the invoke result, and the pause between them
const MAX_POLLS: u32 = 50;
const POLL_MILLIS: u32 = 100;

#[derive(Debug, Serialize)]
struct InvokeScript<'a> {
    contract_id: &'a str,
    rpc_url: &'a str,
    account: &'a str,
    secret_key: &'a str,
    network_passphrase: &'a str,
    function_name: &'a str,
    params: Vec<&'a str>,
    max_polls: u32,
    poll_millis: u32,
}

#[derive(Debug, Serialize)]
struct EventsScript<'a> {
    contract_id: &'a str,
    rpc_url: &'a str,
    start_ledger: u32,
    count: u32,
}

fn render<T: Serialize>(name: &str, template: &str, values: &T) -> Result<String> {
    let template_error = |e: tera::Error| Error::Template {
        name: name.to_string(),
        reason: e.to_string(),
    };
    let context = TeraContext::from_serialize(values).map_err(template_error)?;
    Tera::one_off(template, &context, false).map_err(template_error)
}

/// Driver for the JS soroban client
#[derive(Debug, Clone)]
pub struct NodeJsClient {
    config: Arc<Config>,
}

impl NodeJsClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub(crate) fn invoke_script(&self, call: &Invocation) -> Result<String> {
        let values = InvokeScript {
            contract_id: &call.contract_id,
            rpc_url: &self.config.rpc_url,
            account: &self.config.public_key,
            secret_key: &self.config.secret_key,
            network_passphrase: &self.config.network_passphrase,
            function_name: &call.function,
            // One symbol argument, like the CLI's single positional param
            params: call.params.as_deref().filter(|p| !p.is_empty()).into_iter().collect(),
            max_polls: MAX_POLLS,
            poll_millis: POLL_MILLIS,
        };
        render("invoke.js", INVOKE_TEMPLATE, &values)
    }

    pub(crate) fn events_script(&self, query: &EventQuery) -> Result<String> {
        let values = EventsScript {
            contract_id: &query.contract_id,
            rpc_url: &self.config.rpc_url,
            start_ledger: query.start_ledger,
            count: query.count,
        };
        render("events.js", EVENTS_TEMPLATE, &values)
    }
}

#[async_trait]
impl ContractTool for NodeJsClient {
    fn name(&self) -> &'static str {
        "NODEJS"
    }

    async fn invoke(&self, call: &Invocation) -> Result<String> {
        let operation = "nodejs invoke";
        let script = self.invoke_script(call)?;
        let output = run_checked(
            ToolCommand::new("node").stdin(script),
            &self.config,
            operation,
            &call.contract_name,
        )
        .await?;
        response_text(&output, operation, &call.contract_name)
    }

    async fn invoke_with_profile(&self, _call: &Invocation, _profile: &Profile) -> Result<String> {
        Err(Error::unsupported(
            self.name(),
            "invoke with named identity and network",
        ))
    }

    async fn events(&self, query: &EventQuery) -> Result<Vec<Value>> {
        let script = self.events_script(query)?;
        let output = run_checked(
            ToolCommand::new("node").stdin(script),
            &self.config,
            "nodejs get events",
            &query.contract_id,
        )
        .await?;
        parse_events(&output.stdout)
    }
}
