use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, LINK};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::CardSource;
use crate::config::GitHubConfig;
use crate::credentials::Credentials;
use crate::model::board::{Card, Column, Project};

/// Classic projects are still behind the inertia preview media type.
pub const PROJECTS_PREVIEW: &str = "application/vnd.github.inertia-preview+json";

const USER_AGENT: &str = concat!("review-relay/", env!("CARGO_PKG_VERSION"));

/// Outcome of looking a project or column up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found(u64),
    NotFound,
}

/// Exact name match. When several entries share the name the last one wins.
pub fn resolve<'a>(entries: impl IntoIterator<Item = (&'a str, u64)>, target: &str) -> Resolution {
    entries
        .into_iter()
        .filter(|(name, _)| *name == target)
        .last()
        .map_or(Resolution::NotFound, |(_, id)| Resolution::Found(id))
}

/// Target of the `rel="next"` entry in a GitHub `Link` header.
pub fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        params
            .split(';')
            .any(|p| p.trim() == r#"rel="next""#)
            .then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
    })
}

pub struct GitHubBoardClient {
    api_url: String,
    organization: String,
    project: String,
    column: String,
    per_page: u32,
    token: String,
    client: reqwest::Client,
}

impl GitHubBoardClient {
    pub fn new(config: &GitHubConfig, credentials: &dyn Credentials) -> Result<Self> {
        let token = credentials.github_token()?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build GitHub HTTP client")?;
        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            organization: config.organization.clone(),
            project: config.project.clone(),
            column: config.column.clone(),
            per_page: config.per_page,
            token,
            client,
        })
    }

    /// Fetch every page of a listing, following `Link: rel="next"`.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut request = self
            .client
            .get(format!("{}{path}", self.api_url))
            .query(&[("per_page", self.per_page)]);

        loop {
            let resp = request
                .bearer_auth(&self.token)
                .header(ACCEPT, PROJECTS_PREVIEW)
                .send()
                .await
                .with_context(|| format!("GitHub GET {path} failed"))?
                .error_for_status()
                .with_context(|| format!("GitHub GET {path} returned an error status"))?;

            let next = next_page_url(resp.headers());
            let page: Vec<T> = resp
                .json()
                .await
                .with_context(|| format!("Failed to parse GitHub response for {path}"))?;
            items.extend(page);

            let Some(next) = next else {
                return Ok(items);
            };
            // Only follow links on the configured API host.
            if !next.starts_with(&format!("{}/", self.api_url)) {
                anyhow::bail!("GitHub GET {path} linked to a page outside {}: {next}", self.api_url);
            }
            debug!(path, next = %next, "Following next page");
            request = self.client.get(next);
        }
    }

    async fn projects(&self) -> Result<Vec<Project>> {
        self.get_list(&format!("/orgs/{}/projects", self.organization))
            .await
    }

    async fn columns(&self, project_id: u64) -> Result<Vec<Column>> {
        self.get_list(&format!("/projects/{project_id}/columns"))
            .await
    }

    async fn cards(&self, column_id: u64) -> Result<Vec<Card>> {
        self.get_list(&format!("/projects/columns/{column_id}/cards"))
            .await
    }
}

#[async_trait]
impl CardSource for GitHubBoardClient {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn retrieve_cards(&self) -> Result<Vec<Card>> {
        let projects = self.projects().await?;
        let project_id = match resolve(
            projects.iter().map(|p| (p.name.as_str(), p.id)),
            &self.project,
        ) {
            Resolution::Found(id) => id,
            Resolution::NotFound => {
                warn!(
                    organization = %self.organization,
                    project = %self.project,
                    "Project not found, reporting an empty column"
                );
                return Ok(Vec::new());
            }
        };

        let columns = self.columns(project_id).await?;
        let column_id = match resolve(
            columns.iter().map(|c| (c.name.as_str(), c.id)),
            &self.column,
        ) {
            Resolution::Found(id) => id,
            Resolution::NotFound => {
                warn!(
                    project_id,
                    column = %self.column,
                    "Column not found, reporting an empty column"
                );
                return Ok(Vec::new());
            }
        };

        let cards = self.cards(column_id).await?;
        debug!(project_id, column_id, count = cards.len(), "Retrieved cards");
        Ok(cards)
    }
}
