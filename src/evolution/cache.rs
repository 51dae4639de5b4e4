//! Cached projection of proposals.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::api_types::parse_catalog;
use super::types::Proposal;
use crate::error::ParseError;
use crate::output::LbItem;

/// A proposal as stored in the snapshot: rendered once, matched many times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedProposal {
  pub item: LbItem,
  /// Lowercased string used for matching queries
  #[serde(rename = "searchText")]
  pub search_text: String,
  pub number: Option<i64>,
}

impl From<&Proposal> for CachedProposal {
  fn from(proposal: &Proposal) -> Self {
    Self {
      item: LbItem::from_proposal(proposal),
      search_text: proposal.search_text(),
      number: proposal.number(),
    }
  }
}

/// Decode a catalog body into cached proposals, preserving catalog order.
pub fn build_cached_proposals(
  body: &[u8],
  proposals_base: &Url,
) -> Result<Vec<CachedProposal>, ParseError> {
  let catalog = parse_catalog(body)?;
  debug!(
    creation_date = %catalog.creation_date,
    schema_version = %catalog.schema_version,
    proposals = catalog.proposals.len(),
    "decoded catalog"
  );

  Ok(
    catalog
      .proposals
      .into_iter()
      .map(|dto| CachedProposal::from(&dto.into_proposal(proposals_base)))
      .collect(),
  )
}
