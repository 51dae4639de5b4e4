use chrono::{DateTime, Utc};
use std::fmt;

/// A proposal as the rest of the application sees it
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
  pub id: String,
  pub title: String,
  pub url: String,
  pub status: Status,
  pub feature_flag: Option<FeatureFlag>,
}

/// Upcoming feature flag guarding a proposal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlag {
  pub flag: String,
  pub enabled_in_language_mode: Option<String>,
}

/// Review period, start never after end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewInterval {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

/// Proposal review status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
  AwaitingReview,
  ScheduledForReview,
  ActiveReview(Option<ReviewInterval>),
  ReturnedForRevision,
  Withdrawn,
  Deferred, // no longer in use upstream
  Accepted,
  AcceptedWithRevisions,
  Rejected,
  Implemented(Option<String>),
  Previewing,
  Error(Option<String>),
  /// Any state this version does not know about
  Unknown(String),
}

impl Proposal {
  /// Numeric part of the id, e.g. 147 for "SE-0147".
  pub fn number(&self) -> Option<i64> {
    self.id.rsplit('-').next()?.parse().ok()
  }

  /// Lowercased text used for query matching.
  pub fn search_text(&self) -> String {
    format!(
      "{} {} {} {} {}",
      self.id,
      self.number().map(|n| n.to_string()).unwrap_or_default(),
      self.title,
      self.status,
      self
        .feature_flag
        .as_ref()
        .map(|f| f.flag.as_str())
        .unwrap_or_default()
    )
    .to_lowercase()
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Status::AwaitingReview => write!(f, "Awaiting Review"),
      Status::ScheduledForReview => write!(f, "Scheduled for Review"),
      Status::ActiveReview(Some(interval)) => write!(
        f,
        "Active Review ({} to {})",
        interval.start.format("%Y-%m-%d"),
        interval.end.format("%Y-%m-%d")
      ),
      Status::ActiveReview(None) => write!(f, "Active Review"),
      Status::ReturnedForRevision => write!(f, "Returned for Revision"),
      Status::Withdrawn => write!(f, "Withdrawn"),
      Status::Deferred => write!(f, "Deferred"),
      Status::Accepted => write!(f, "Accepted"),
      Status::AcceptedWithRevisions => write!(f, "Accepted with Revisions"),
      Status::Rejected => write!(f, "Rejected"),
      Status::Implemented(Some(version)) => write!(f, "Implemented (Swift {})", version),
      Status::Implemented(None) => write!(f, "Implemented"),
      Status::Previewing => write!(f, "Previewing"),
      Status::Error(reason) => write!(
        f,
        "Error ({})",
        reason.as_deref().unwrap_or("unknown reason")
      ),
      Status::Unknown(state) => write!(f, "Unknown status: {}", state),
    }
  }
}
