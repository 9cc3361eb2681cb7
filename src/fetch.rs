use anyhow::{Context, Result};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::api_types::ApiQueryResponse;
use crate::config::ConceptNetConfig;
use crate::models::Relation;

/// Source of terms related to a query string. An empty list is a normal answer.
#[allow(async_fn_in_trait)]
pub trait RelationLookup {
    async fn lookup(&self, query: &str, relations: &[Relation]) -> Result<Vec<String>>;
}

/// Client for the ConceptNet 5 REST API.
pub struct ConceptNetClient {
    client: Client,
    base_url: Url,
    language: String,
    limit: usize,
}

impl ConceptNetClient {
    pub fn new(cfg: &ConceptNetConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        let base_url = Url::parse(&cfg.base_url)
            .with_context(|| format!("Invalid ConceptNet base URL {}", cfg.base_url))?;
        Ok(Self {
            client,
            base_url,
            language: cfg.language.clone(),
            limit: cfg.limit,
        })
    }

    /// Concept URI for `term` in the configured language (`/c/ja/走る`).
    fn node(&self, term: &str) -> String {
        format!("/c/{}/{}", self.language, term.to_lowercase().replace(' ', "_"))
    }

    fn query_url(&self, node: &str, relation: Relation) -> Result<Url> {
        let mut url = self.base_url.join("query")?;
        url.query_pairs_mut()
            .append_pair("node", node)
            .append_pair("rel", &format!("/r/{}", relation.as_str()))
            .append_pair("limit", &self.limit.to_string());
        Ok(url)
    }

    async fn query_relation(&self, node: &str, relation: Relation) -> Result<Vec<String>> {
        let url = self.query_url(node, relation)?;
        let start = std::time::Instant::now();

        let resp = self.client.get(url.clone()).send().await
            .with_context(|| format!("Request failed for {}", url))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            warn!("ConceptNet node not found (404) - node={}, rel={}", node, relation.as_str());
            return Ok(Vec::new());
        }

        let resp = resp.error_for_status()
            .with_context(|| format!("HTTP error for {}", url))?;

        let body: ApiQueryResponse = resp.json().await
            .with_context(|| format!("Decoding JSON for {}", url))?;

        let terms = related_terms(&body, node, &self.language);
        debug!(
            "ConceptNet query completed - node={}, rel={}, edges={}, terms={}, duration={:.2}s",
            node,
            relation.as_str(),
            body.edges.len(),
            terms.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(terms)
    }
}

impl RelationLookup for ConceptNetClient {
    async fn lookup(&self, query: &str, relations: &[Relation]) -> Result<Vec<String>> {
        let node = self.node(query);
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();
        let mut answered = 0;
        let mut last_err = None;
        for &relation in relations {
            match self.query_relation(&node, relation).await {
                Ok(terms) => {
                    answered += 1;
                    for term in terms {
                        if seen.insert(term.clone()) {
                            out.push(term);
                        }
                    }
                }
                Err(e) => {
                    warn!("ConceptNet relation skipped - node={}, rel={}, error={:#}", node, relation.as_str(), e);
                    last_err = Some(e);
                }
            }
        }
        // Partial answers are kept; only a lookup with no successful relation fails.
        match last_err {
            Some(e) if answered == 0 => Err(e),
            _ => Ok(out),
        }
    }
}

/// Labels on the far side of every edge touching `node`, restricted to `language`,
/// deduplicated in response order.
pub fn related_terms(body: &ApiQueryResponse, node: &str, language: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for edge in &body.edges {
        let other = if edge.start.term_uri() == node {
            &edge.end
        } else if edge.end.term_uri() == node {
            &edge.start
        } else {
            continue;
        };
        if other.language.as_deref() != Some(language) || other.term_uri() == node {
            continue;
        }
        let label = other.label.trim();
        if !label.is_empty() && seen.insert(label) {
            out.push(label.to_string());
        }
    }
    out
}
