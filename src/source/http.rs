//! `reqwest`-backed [`NoticeSource`] for the public search endpoint.
//!
//! One client is built per run and shared by the sequential collection stage
//! and every detail-fetch worker, taking advantage of connection pooling.
//! Each request carries its own timeout; nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::{DetailRef, FilterSpec, Notice, NoticeSource, SearchPage, SourceError};
use crate::config::HarvestConfig;
use crate::user_agent;

/// HTTP implementation of [`NoticeSource`].
#[derive(Debug, Clone)]
pub struct HttpNoticeSource {
    client: Client,
    base_url: Url,
    probe_page_size: u32,
}

impl HttpNoticeSource {
    /// Builds a source from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if the base URL does not parse and
    /// [`SourceError::ClientBuild`] if the HTTP client cannot be constructed.
    #[instrument(level = "debug", skip(config), fields(base_url = %config.base_url))]
    pub fn new(config: &HarvestConfig) -> Result<Self, SourceError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|_| SourceError::invalid_url(config.base_url.clone()))?;

        let client = ClientBuilder::new()
            .default_headers(user_agent::default_headers(config.cookie.as_deref()))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(config.timeout))
            .timeout(config.timeout)
            .gzip(true)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|source| SourceError::ClientBuild { source })?;

        debug!(
            timeout_secs = config.timeout.as_secs_f64(),
            insecure = config.insecure,
            cookie = config.cookie.is_some(),
            "created HTTP notice source"
        );

        Ok(Self {
            client,
            base_url,
            probe_page_size: config.page_size,
        })
    }

    /// Builds the search URL for one page of a partition.
    #[must_use]
    pub fn search_url(&self, filter: &FilterSpec, page: u32, page_size: u32) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            query.append_pair("resultPerPage", &page_size.to_string());
            for (name, value) in filter.query_pairs() {
                query.append_pair(name, &value);
            }
        }
        url
    }

    /// Resolves a detail reference to an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if the reference does not form a valid URL.
    pub fn detail_url(&self, reference: &DetailRef) -> Result<Url, SourceError> {
        match reference {
            DetailRef::Url(url) => Url::parse(url).map_err(|_| SourceError::invalid_url(url)),
            DetailRef::EntityId(id) => {
                let joined = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), id);
                Url::parse(&joined).map_err(|_| SourceError::invalid_url(joined))
            }
        }
    }

    async fn search(
        &self,
        filter: &FilterSpec,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, SourceError> {
        let url = self.search_url(filter, page, page_size);
        let body = self.get_json(&url).await?;
        SearchPage::from_value(body)
            .ok_or_else(|| SourceError::malformed(url.as_str(), "search body is not a JSON object"))
    }

    async fn get_json(&self, url: &Url) -> Result<Value, SourceError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SourceError::transport(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::http_status(url.as_str(), status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SourceError::transport(url.as_str(), e))?;
        serde_json::from_str(&text).map_err(|e| SourceError::malformed(url.as_str(), e.to_string()))
    }
}

#[async_trait]
impl NoticeSource for HttpNoticeSource {
    #[instrument(level = "debug", skip(self), fields(filter = %filter))]
    async fn probe_total(&self, filter: &FilterSpec) -> Result<u64, SourceError> {
        let page = self.search(filter, 1, self.probe_page_size).await?;
        let total = page.effective_total();
        debug!(reported = page.reported_total, total, "probed partition");
        Ok(total)
    }

    #[instrument(level = "debug", skip(self), fields(filter = %filter))]
    async fn fetch_page(
        &self,
        filter: &FilterSpec,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Notice>, SourceError> {
        Ok(self.search(filter, page, page_size).await?.notices)
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_detail(&self, reference: &DetailRef) -> Result<Notice, SourceError> {
        let url = self.detail_url(reference)?;
        let body = self.get_json(&url).await?;
        Notice::from_value(body)
            .ok_or_else(|| SourceError::malformed(url.as_str(), "detail body is not a JSON object"))
    }
}
