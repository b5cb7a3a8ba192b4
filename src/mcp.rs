use crate::config::ServerConfig;
use crate::error::NdsError;
use crate::models::{InfoResponse, QuantityResult};
use crate::paths::PathResolver;
use crate::reactions::ReactionLookup;
use anyhow::Context;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, schemars, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Nuclear data MCP server
#[derive(Clone)]
pub struct NdsMcp {
    config: Arc<ServerConfig>,
    resolver: PathResolver,
    lookup: ReactionLookup,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NuclideInput {
    /// Proton number
    #[serde(rename = "Z")]
    pub z: u32,
    /// Mass number
    #[serde(rename = "A")]
    pub a: u32,
    /// Single quantity name; omit for the whole family
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json =
        serde_json::to_string(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn to_mcp_error(e: NdsError) -> McpError {
    match e {
        NdsError::InvalidParams { message, details } => {
            McpError::invalid_params(message, serde_json::to_value(details).ok())
        }
        other => {
            error!("tool failed: {other}");
            McpError::internal_error(other.to_string(), None)
        }
    }
}

impl NdsMcp {
    pub fn info(&self) -> Result<InfoResponse, NdsError> {
        self.resolver.describe_all(&self.config)
    }

    pub async fn separation_energy(
        &self,
        input: &NuclideInput,
    ) -> Result<Option<QuantityResult>, NdsError> {
        let path = self.resolver.require(&self.config.nds)?;
        self.lookup
            .get_separation_energy(path.as_path(), input.z, input.a, input.kind.as_deref())
            .await
    }

    pub async fn q_value(&self, input: &NuclideInput) -> Result<Option<QuantityResult>, NdsError> {
        let path = self.resolver.require(&self.config.nds)?;
        self.lookup
            .get_q_value(path.as_path(), input.z, input.a, input.kind.as_deref())
            .await
    }
}

#[tool_router]
impl NdsMcp {
    /// Check the schema of the database present at startup.
    ///
    /// Lookups resolve the path again on every call, so a database installed
    /// or replaced later is picked up.
    pub async fn new(config: ServerConfig) -> Result<Self, NdsError> {
        let resolver: PathResolver = PathResolver::default();
        let lookup: ReactionLookup = ReactionLookup::default();

        match resolver.resolve(&config.nds)? {
            Some(path) => {
                lookup.verify_schema(path.as_path()).await?;
                info!(path = %path, "nuclear data database ready");
            }
            None => warn!(
                env = %config.nds.env_name,
                "nuclear data database not configured yet; lookups fail until it is installed"
            ),
        }

        Ok(Self {
            config: Arc::new(config),
            resolver,
            lookup,
            tool_router: Self::tool_router(),
        })
    }

    #[tool(
        description = "Report where the local nuclear data databases are, their size in MB, and how to install them if missing."
    )]
    async fn nds_info(&self) -> Result<CallToolResult, McpError> {
        debug!("nds_info");
        let info = self.info().map_err(to_mcp_error)?;
        to_json(&info)
    }

    #[tool(
        description = "Nucleon separation energies (Sn, Sp, S2n, S2p) in keV for the nuclide (Z, A). Pass type to get a single one. Returns null if the nuclide is not tabulated."
    )]
    async fn get_separation_energy(
        &self,
        params: Parameters<NuclideInput>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        debug!(z = p.z, a = p.a, kind = ?p.kind, "get_separation_energy");
        let result = self.separation_energy(&p).await.map_err(to_mcp_error)?;
        to_json(&result)
    }

    #[tool(
        description = "Reaction and decay Q-values (Qa, Q2bm, Qep, Qbn, Q4bm, Qda, Qpa, Qna) in keV for the nuclide (Z, A). Pass type to get a single one. Returns null if the nuclide is not tabulated."
    )]
    async fn get_q_value(
        &self,
        params: Parameters<NuclideInput>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        debug!(z = p.z, a = p.a, kind = ?p.kind, "get_q_value");
        let result = self.q_value(&p).await.map_err(to_mcp_error)?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for NdsMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Nuclear data lookups. Call nds_info first to check the database is installed, \
                 then get_separation_energy or get_q_value with the proton number Z and mass number A. \
                 Values are in keV; a null result means the nuclide is not in the table."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_mcp_server(config: ServerConfig) -> anyhow::Result<()> {
    let mcp = NdsMcp::new(config)
        .await
        .context("Failed to initialize MCP server")?;

    let service = mcp.serve(stdio()).await.inspect_err(|e| {
        error!("Error starting MCP server: {e}");
    })?;

    service.waiting().await?;
    Ok(())
}
