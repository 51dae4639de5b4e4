//! Serde-deserializable types matching the evolution.json catalog.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use super::types::{FeatureFlag, Proposal, ReviewInterval, Status};
use crate::error::ParseError;

/// Decode a catalog document.
pub fn parse_catalog(bytes: &[u8]) -> Result<ApiCatalog, ParseError> {
  Ok(serde_json::from_slice(bytes)?)
}

// ============================================================================
// Catalog document
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiCatalog {
  /// E.g. "2024-05-14T13:38:30Z"
  #[serde(rename = "creationDate")]
  pub creation_date: String,
  /// E.g. "1.0.0"
  #[serde(rename = "schemaVersion")]
  pub schema_version: String,
  pub proposals: Vec<ApiProposal>,
}

#[derive(Debug, Deserialize)]
pub struct ApiProposal {
  /// SE-NNNN, e.g. "SE-0147"
  pub id: String,
  pub title: String,
  /// Proposal file name, e.g. "0423-dynamic-actor-isolation.md"
  pub link: String,
  pub status: ApiStatus,
  #[serde(rename = "upcomingFeatureFlag")]
  pub upcoming_feature_flag: Option<ApiFeatureFlag>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStatus {
  pub state: String,
  /// Only present for implemented proposals, e.g. "5.6"
  pub version: Option<String>,
  /// Review period bounds, e.g. "2024-05-08T00:00:00Z"
  pub start: Option<String>,
  pub end: Option<String>,
  /// Only present for the error state
  pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiFeatureFlag {
  /// E.g. "ExistentialAny"
  pub flag: String,
  /// Language mode in which the feature is always enabled
  #[serde(rename = "enabledInLanguageMode")]
  pub enabled_in_language_mode: Option<String>,
}

// ============================================================================
// Conversion to domain types
// ============================================================================

impl ApiProposal {
  pub fn into_proposal(self, proposals_base: &Url) -> Proposal {
    Proposal {
      url: resolve_link(proposals_base, &self.link),
      title: self.title.trim().to_string(),
      id: self.id,
      status: self.status.into_status(),
      feature_flag: self.upcoming_feature_flag.map(ApiFeatureFlag::into_flag),
    }
  }
}

impl ApiStatus {
  pub fn into_status(self) -> Status {
    match self.state.as_str() {
      "awaitingReview" => Status::AwaitingReview,
      "scheduledForReview" => Status::ScheduledForReview,
      "activeReview" => Status::ActiveReview(review_interval(
        self.start.as_deref(),
        self.end.as_deref(),
      )),
      "returnedForRevision" => Status::ReturnedForRevision,
      "withdrawn" => Status::Withdrawn,
      "deferred" => Status::Deferred,
      "accepted" => Status::Accepted,
      "acceptedWithRevisions" => Status::AcceptedWithRevisions,
      "rejected" => Status::Rejected,
      "implemented" => Status::Implemented(self.version),
      "previewing" => Status::Previewing,
      "error" => Status::Error(self.reason),
      _ => Status::Unknown(self.state),
    }
  }
}

impl ApiFeatureFlag {
  fn into_flag(self) -> FeatureFlag {
    FeatureFlag {
      flag: self.flag,
      enabled_in_language_mode: self.enabled_in_language_mode,
    }
  }
}

/// Both bounds must parse and be ordered, otherwise there is no interval.
fn review_interval(start: Option<&str>, end: Option<&str>) -> Option<ReviewInterval> {
  let start = parse_timestamp(start?)?;
  let end = parse_timestamp(end?)?;
  (start <= end).then_some(ReviewInterval { start, end })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

/// Append a relative link to the base path without validating the result.
fn resolve_link(base: &Url, link: &str) -> String {
  let mut url = base.clone();
  match url.path_segments_mut() {
    Ok(mut segments) => {
      segments.pop_if_empty().extend(link.split('/'));
    }
    Err(()) => return format!("{}/{}", base.as_str().trim_end_matches('/'), link),
  }
  url.to_string()
}
