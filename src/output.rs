//! Result rows in the format the launcher reads from the script's stdout.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

use crate::error::describe_error;
use crate::evolution::types::Proposal;

const PROPOSAL_ICON: &str = "icon.png";

/// One row in the launcher's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LbItem {
  /// The title displayed in the result row
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subtitle: Option<String>,
  /// Text handed to the action when the row is chosen
  #[serde(skip_serializing_if = "Option::is_none")]
  pub action_argument: Option<String>,
  /// Opened when the row is chosen
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
  /// Right-aligned text
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  /// Right-aligned text in a rounded rectangle, after `label`
  #[serde(skip_serializing_if = "Option::is_none")]
  pub badge: Option<String>,
  #[serde(default = "default_true")]
  pub always_shows_subtitle: bool,
}

fn default_true() -> bool {
  true
}

impl LbItem {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      subtitle: None,
      action_argument: None,
      url: None,
      icon: None,
      label: None,
      badge: None,
      always_shows_subtitle: true,
    }
  }

  pub fn from_proposal(proposal: &Proposal) -> Self {
    let mut subtitle = proposal.status.to_string();
    if let Some(flag) = &proposal.feature_flag {
      subtitle.push_str(" · Feature flag: ");
      subtitle.push_str(&flag.flag);
      if let Some(mode) = &flag.enabled_in_language_mode {
        subtitle.push_str(&format!(" (enabled in Swift {} language version)", mode));
      }
    }

    Self {
      subtitle: Some(subtitle),
      url: Some(proposal.url.clone()),
      icon: Some(PROPOSAL_ICON.to_string()),
      ..Self::new(format!("{}: {}", proposal.id, proposal.title))
    }
  }

  /// A single row reporting a failure, with the full cause chain attached.
  pub fn from_error(kind: &str, err: &(dyn StdError + 'static)) -> Self {
    let title = format!("Error: {}", err);
    let details = describe_error(kind, err);
    Self {
      subtitle: Some(details.clone()),
      action_argument: Some(format!("{}\n{}", title, details)),
      ..Self::new(title)
    }
  }
}

/// Serialize rows as pretty-printed JSON with keys in sorted order.
pub fn render(items: &[LbItem]) -> serde_json::Result<String> {
  // serde_json::Map keeps keys sorted
  let value = serde_json::to_value(items)?;
  serde_json::to_string_pretty(&value)
}

/// Render rows, degrading to an error row and finally to an empty list.
pub fn render_or_fallback(items: &[LbItem]) -> String {
  match render(items) {
    Ok(json) => json,
    Err(e) => render(&[LbItem::from_error("EncodeError", &e)]).unwrap_or_else(|_| "[]".to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::{FetchError, ResolveError};
  use crate::evolution::types::{FeatureFlag, Status};

  fn proposal() -> Proposal {
    Proposal {
      id: "SE-0335".to_string(),
      title: "Introduce existential any".to_string(),
      url: "https://example.com/proposals/0335-existential-any.md".to_string(),
      status: Status::Implemented(Some("5.6".to_string())),
      feature_flag: None,
    }
  }

  #[test]
  fn test_from_proposal() {
    let item = LbItem::from_proposal(&proposal());

    assert_eq!(item.title, "SE-0335: Introduce existential any");
    assert_eq!(item.subtitle.as_deref(), Some("Implemented (Swift 5.6)"));
    assert_eq!(
      item.url.as_deref(),
      Some("https://example.com/proposals/0335-existential-any.md")
    );
    assert_eq!(item.icon.as_deref(), Some("icon.png"));
    assert!(item.always_shows_subtitle);
    assert!(item.action_argument.is_none());
  }

  #[test]
  fn test_feature_flag_subtitle() {
    let mut p = proposal();
    p.feature_flag = Some(FeatureFlag {
      flag: "ExistentialAny".to_string(),
      enabled_in_language_mode: None,
    });
    assert_eq!(
      LbItem::from_proposal(&p).subtitle.as_deref(),
      Some("Implemented (Swift 5.6) · Feature flag: ExistentialAny")
    );

    p.feature_flag = Some(FeatureFlag {
      flag: "ExistentialAny".to_string(),
      enabled_in_language_mode: Some("6".to_string()),
    });
    assert_eq!(
      LbItem::from_proposal(&p).subtitle.as_deref(),
      Some(
        "Implemented (Swift 5.6) · Feature flag: ExistentialAny (enabled in Swift 6 language version)"
      )
    );
  }

  #[test]
  fn test_from_error() {
    let err = ResolveError::from(FetchError::NotModifiedWithoutCache);
    let item = LbItem::from_error(err.kind(), &err);

    assert_eq!(
      item.title,
      "Error: server reported 304 Not Modified but no cached catalog exists"
    );
    assert_eq!(
      item.action_argument.as_deref(),
      Some(
        "Error: server reported 304 Not Modified but no cached catalog exists\n\
         NetworkError: server reported 304 Not Modified but no cached catalog exists"
      )
    );
    assert!(item.url.is_none());
  }

  #[test]
  fn test_render_sorts_keys_and_omits_absent_fields() {
    let json = render(&[LbItem::from_proposal(&proposal())]).unwrap();

    let keys: Vec<&str> = json
      .lines()
      .filter_map(|line| line.trim().strip_prefix('"'))
      .filter_map(|rest| rest.split('"').next())
      .collect();
    assert_eq!(
      keys,
      vec!["alwaysShowsSubtitle", "icon", "subtitle", "title", "url"]
    );
    assert!(json.starts_with("[\n"));
  }

  #[test]
  fn test_render_empty_list() {
    assert_eq!(render(&[]).unwrap(), "[]");
  }

  #[test]
  fn test_deserialize_defaults_always_shows_subtitle() {
    let item: LbItem = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
    assert!(item.always_shows_subtitle);
  }
}
