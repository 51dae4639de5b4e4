//! Command line handling.
//!
//! The launcher passes whatever the user typed as separate arguments, so
//! anything that is not one of the two known flags is query text, including
//! words that look like flags. Flags are recognized in any position.

pub const USAGE: &str = "\
Usage: evolution-lookup [--debug|-d] [--help|-h] [query...]
  --debug, -d   Enable verbose logging
  --help, -h    Show this help message
";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
  /// Query words joined by single spaces
  pub query: String,
  pub debug: bool,
  pub help: bool,
}

impl Args {
  pub fn parse() -> Self {
    Self::parse_from(std::env::args().skip(1))
  }

  /// Parse arguments, excluding the program name.
  pub fn parse_from<I, S>(args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut parsed = Self::default();
    let mut words = Vec::new();

    for arg in args {
      let arg = arg.into();
      match arg.as_str() {
        "--debug" | "-d" => parsed.debug = true,
        "--help" | "-h" => parsed.help = true,
        _ => words.push(arg),
      }
    }

    parsed.query = words.join(" ");
    parsed
  }
}
