//! Free-text and numeric query matching.
//!
//! A query is split into lowercase words:
//! - no words matches everything
//! - a single word that parses as an integer matches only that proposal number
//! - otherwise a record matches if its search text contains any of the words

/// A parsed user query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
  words: Vec<String>,
}

impl Query {
  pub fn parse(input: &str) -> Self {
    Self {
      words: input.split_whitespace().map(str::to_lowercase).collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  /// `search_text` must already be lowercase.
  pub fn matches(&self, number: Option<i64>, search_text: &str) -> bool {
    if self.words.is_empty() {
      return true;
    }

    if let [word] = self.words.as_slice() {
      if let Ok(wanted) = word.parse::<i64>() {
        return number == Some(wanted);
      }
    }

    self.words.iter().any(|word| search_text.contains(word.as_str()))
  }
}
