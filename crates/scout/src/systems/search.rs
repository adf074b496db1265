use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::System;
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

pub const TAVILY_HOST: &str = "https://api.tavily.com";

/// Upper bound on results per search call
pub const MAX_SEARCH_RESULTS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub host: String,
    pub api_key: String,
    pub max_results: u32,
}

impl SearchConfig {
    pub fn new<H: Into<String>, K: Into<String>>(host: H, api_key: K) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            max_results: MAX_SEARCH_RESULTS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResponseItem>,
}

#[derive(Debug, Deserialize)]
struct TavilyResponseItem {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResult {
    title: String,
    url: String,
    content: String,
}

/// Web search backed by the Tavily search API
pub struct SearchSystem {
    tools: Vec<Tool>,
    client: Client,
    config: SearchConfig,
}

impl SearchSystem {
    pub fn new(mut config: SearchConfig) -> Result<Self> {
        config.max_results = config.max_results.clamp(1, MAX_SEARCH_RESULTS);

        let search_tool = Tool::new(
            "tavily_search",
            indoc::indoc! {r#"
                Search the web for current information.
                Returns a JSON list of results with title, url and content for each hit.
                Use this for recent events or facts you are not sure about.
            "#},
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {"type": "string", "description": "The search query."}
                }
            }),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            tools: vec![search_tool],
            client,
            config,
        })
    }

    pub fn max_results(&self) -> u32 {
        self.config.max_results
    }

    async fn search(&self, query: &str) -> AgentResult<Vec<Content>> {
        debug!(query, max_results = self.config.max_results, "running web search");

        let url = format!("{}/search", self.config.host.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "api_key": self.config.api_key,
                "query": query,
                "search_depth": "basic",
                "max_results": self.config.max_results,
            }))
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::ExecutionError(format!(
                "Search API returned {}",
                response.status()
            )));
        }

        let data: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let results: Vec<SearchResult> = data
            .results
            .into_iter()
            .filter_map(|item| {
                Some(SearchResult {
                    title: item.title.unwrap_or_default(),
                    url: item.url?,
                    content: item.content.unwrap_or_default(),
                })
            })
            .take(self.config.max_results as usize)
            .collect();

        let text = serde_json::to_string(&results)
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        Ok(vec![Content::text(text)])
    }
}

#[async_trait]
impl System for SearchSystem {
    fn name(&self) -> &str {
        "search"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "tavily_search" => {
                let query = tool_call
                    .arguments
                    .get("query")
                    .and_then(|q| q.as_str())
                    .ok_or_else(|| {
                        AgentError::InvalidParameters("Missing 'query' parameter".to_string())
                    })?;
                self.search(query).await
            }
            _ => Err(AgentError::ToolNotFound(tool_call.name)),
        }
    }
}
