/// Latest-episode discovery from a programme listing page
use crate::config::LocatorConfig;
use crate::error::{PipelineError, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Finds the newest episode link on a listing page
#[derive(Clone)]
pub struct EpisodeLocator {
    client: Client,
    link_selector: String,
}

impl EpisodeLocator {
    pub fn new(config: &LocatorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PipelineError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            link_selector: config.link_selector.clone(),
        })
    }

    /// Fetch the listing page and return the absolute URL of the latest episode
    pub async fn latest_episode(&self, listing_url: &str) -> Result<Url> {
        info!("🔍 Looking up latest episode on {}", listing_url);

        let base = Url::parse(listing_url).map_err(|e| PipelineError::network(listing_url, e))?;

        let response = self
            .client
            .get(base.clone())
            .send()
            .await
            .map_err(|e| PipelineError::network(listing_url, e))?;

        if !response.status().is_success() {
            return Err(PipelineError::network(
                listing_url,
                format!("HTTP {}", response.status()),
            ));
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::network(listing_url, e))?;
        debug!("Fetched listing page ({} bytes)", html.len());

        let episode = find_episode_link(&html, &base, &self.link_selector)?;
        info!("📺 Latest episode: {}", episode);
        Ok(episode)
    }
}

/// Resolve the first `selector` match with an `href` against `base`
pub fn find_episode_link(html: &str, base: &Url, selector: &str) -> Result<Url> {
    let not_found = || PipelineError::EpisodeNotFound {
        url: base.to_string(),
        selector: selector.to_string(),
    };

    let parsed_selector = Selector::parse(selector)
        .map_err(|e| PipelineError::Config(format!("invalid link selector '{}': {:?}", selector, e)))?;

    let document = Html::parse_document(html);
    let href = document
        .select(&parsed_selector)
        .find_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or_else(not_found)?;

    base.join(href).map_err(|_| not_found())
}
