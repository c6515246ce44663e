use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::RequestBuilder;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::resource::Resource;
use crate::config::Config;
use crate::listing::{ListQuery, Page};

/// REST client for the warehouse backend
#[derive(Clone)]
pub struct ApiClient {
  client: reqwest::Client,
  base_url: Url,
  token: Option<String>,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base_url = parse_base_url(&config.api.url)?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .gzip(true)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      base_url,
      token: Config::get_api_token(),
    })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Fetch one page of a collection
  pub async fn list<R: Resource>(&self, query: &ListQuery) -> Result<Page<R>> {
    let url = collection_url::<R>(&self.base_url)?;
    debug!(%url, query = %query.cache_key(), "listing {}", R::PATH);

    let request = self.authorized(self.client.get(url)).query(&query.params());
    let body = send(request).await?;

    serde_json::from_slice(&body).map_err(|e| eyre!("Failed to parse {} page: {}", R::PATH, e))
  }

  /// Delete a single record by id
  pub async fn delete<R: Resource>(&self, id: u64) -> Result<()> {
    let url = record_url::<R>(&self.base_url, id)?;
    debug!(%url, "deleting");

    send(self.authorized(self.client.delete(url))).await?;
    Ok(())
  }

  /// A listing fetcher for collection `R` backed by this client.
  pub fn fetcher<R: Resource>(
    &self,
  ) -> impl Fn(ListQuery) -> BoxFuture<'static, Result<Page<R>>> + Send + Sync + 'static {
    let api = self.clone();
    move |query: ListQuery| {
      let api = api.clone();
      async move { api.list::<R>(&query).await }.boxed()
    }
  }

  fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }
}

/// Send a request, turning non-2xx responses into errors carrying the body.
async fn send(request: RequestBuilder) -> Result<Vec<u8>> {
  let response = request
    .send()
    .await
    .map_err(|e| eyre!("Request failed: {}", e))?;

  let status = response.status();
  let body = response
    .bytes()
    .await
    .map_err(|e| eyre!("Failed to read response body: {}", e))?;

  if !status.is_success() {
    let text = String::from_utf8_lossy(&body);
    return Err(eyre!("Backend returned {}: {}", status, text.trim()));
  }

  Ok(body.to_vec())
}

/// Parse the configured base URL so that relative joins land under it.
fn parse_base_url(raw: &str) -> Result<Url> {
  let mut url = Url::parse(raw.trim()).map_err(|e| eyre!("Invalid API url '{}': {}", raw, e))?;
  if url.cannot_be_a_base() {
    return Err(eyre!("Invalid API url '{}': not a base url", raw));
  }
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}

fn collection_url<R: Resource>(base: &Url) -> Result<Url> {
  base
    .join(R::PATH)
    .map_err(|e| eyre!("Invalid collection path {}: {}", R::PATH, e))
}

fn record_url<R: Resource>(base: &Url, id: u64) -> Result<Url> {
  base
    .join(&format!("{}/{}", R::PATH, id))
    .map_err(|e| eyre!("Invalid record path {}/{}: {}", R::PATH, id, e))
}
