//! Patchwork REST client

use crate::config::TrackerConfig;
use crate::error::{Error, Result};
use crate::tracker::{CheckSubmission, TrackerService};
use crate::types::{CheckReport, Patch, Series};
use async_trait::async_trait;
use reqwest::header::LINK;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct CheckPayload<'a> {
    user: u64,
    state: u8,
    target_url: &'a str,
    context: &'a str,
    description: &'a str,
}

/// Patchwork service using reqwest
pub struct PatchworkClient {
    client: Client,
    base_url: String,
    project: String,
    user: u64,
    /// Write token; checks are not posted without it
    token: Option<String>,
}

impl PatchworkClient {
    /// Create a new Patchwork client
    pub fn new(config: &TrackerConfig, token: Option<String>) -> Result<Self> {
        url::Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("invalid tracker url '{}': {e}", config.url)))?;

        let client = Client::builder()
            .user_agent("patchbridge")
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            user: config.user,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, url: &str) -> Result<Response> {
        debug!(url, "tracker GET");
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(Error::TrackerUnavailable {
                method: "GET",
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        Ok(self.get(url).await?.json().await?)
    }
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(ToString::to_string)
    })
}

#[async_trait]
impl TrackerService for PatchworkClient {
    async fn fetch_series(&self, id: u64) -> Result<Series> {
        self.get_json(&self.api_url(&format!("/series/{id}"))).await
    }

    async fn fetch_patch(&self, id: u64) -> Result<Patch> {
        debug!(patch_id = id, "fetching patch");
        self.get_json(&self.api_url(&format!("/patches/{id}"))).await
    }

    async fn fetch_patches_by_state(&self, states: &[String]) -> Result<Vec<Patch>> {
        let mut url = self.api_url(&format!("/patches/?project={}&archived=0", self.project));
        for state in states {
            url.push_str("&state=");
            url.push_str(state);
        }
        debug!(?states, url, "fetching patches by state");

        let mut patches = Vec::new();
        loop {
            let response = self.get(&url).await?;
            let next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_next_link);

            let mut page: Vec<Patch> = response.json().await?;
            debug!(count = page.len(), "read page of patches");
            patches.append(&mut page);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        info!(total = patches.len(), "read all patches");
        Ok(patches)
    }

    async fn fetch_mbox(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }

    async fn submit_check(&self, report: &CheckReport) -> Result<CheckSubmission> {
        let Some(token) = &self.token else {
            warn!(
                patch_id = report.patch_id,
                "PATCHWORK_TOKEN not set, not submitting check"
            );
            return Ok(CheckSubmission::Skipped);
        };

        let url = self.api_url(&format!("/patches/{}/checks/", report.patch_id));
        let payload = CheckPayload {
            user: self.user,
            state: report.outcome.code(),
            target_url: report.target_url.as_deref().unwrap_or_default(),
            context: &report.context,
            description: &report.description,
        };
        debug!(patch_id = report.patch_id, outcome = %report.outcome, "submitting check");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {token}"))
            .json(&payload)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(Error::TrackerUnavailable {
                method: "POST",
                url,
                status: response.status().as_u16(),
            });
        }

        info!(patch_id = report.patch_id, outcome = %report.outcome, "check submitted");
        Ok(CheckSubmission::Posted)
    }
}
