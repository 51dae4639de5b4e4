//! Cached evolution client that wraps EvolutionClient with conditional caching.

use color_eyre::Result;
use std::cmp::Reverse;
use tracing::debug;
use url::Url;

use crate::cache::{CacheLayer, CacheStorage};
use crate::config::Config;
use crate::error::ResolveError;
use crate::output::LbItem;
use crate::query::Query;

use super::cache::{build_cached_proposals, CachedProposal};
use super::client::EvolutionClient;

/// Proposal search backed by a revalidated local snapshot.
///
/// Fetch and decode failures are absorbed whenever a snapshot exists; only
/// a run with nothing cached can fail.
pub struct CachedEvolutionClient<S: CacheStorage> {
  inner: EvolutionClient,
  cache: CacheLayer<S>,
  proposals_base: Url,
}

impl<S: CacheStorage> CachedEvolutionClient<S> {
  pub fn new(config: &Config, storage: S) -> Result<Self> {
    Ok(Self {
      inner: EvolutionClient::new(config)?,
      cache: CacheLayer::new(storage),
      proposals_base: config.proposals_base_url()?,
    })
  }

  /// Matching proposals, highest number first.
  pub async fn search(&self, query: &Query) -> Result<Vec<LbItem>, ResolveError> {
    let result = self
      .cache
      .fetch_conditional(
        |validators| self.inner.fetch(validators),
        |body| build_cached_proposals(body, &self.proposals_base),
      )
      .await?;
    debug!(
      source = ?result.source,
      cached_at = %result.cached_at,
      proposals = result.data.len(),
      "resolved catalog"
    );

    let items = select(result.data, query);
    debug!(results = items.len(), empty_query = query.is_empty(), "filtered");
    Ok(items)
  }
}

/// Filter by query and order by number, descending. Proposals without a
/// number sort as 0; ties keep catalog order.
fn select(proposals: Vec<CachedProposal>, query: &Query) -> Vec<LbItem> {
  let mut matched: Vec<CachedProposal> = proposals
    .into_iter()
    .filter(|p| query.matches(p.number, &p.search_text))
    .collect();
  matched.sort_by_key(|p| Reverse(p.number.unwrap_or(0)));
  matched.into_iter().map(|p| p.item).collect()
}
