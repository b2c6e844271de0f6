//! Ticker universe — named theme groups loaded from TOML.
//!
//! A universe is a map of theme name to ticker list. Scans target either the
//! whole universe (union of all themes, deduplicated) or a single theme. The
//! built-in default universe keeps the demo path working with no files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stratlab_core::domain::Symbol;

/// Errors from loading or querying a universe.
#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("failed to read universe file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse universe: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown theme '{name}'. Valid: {available}")]
    UnknownTheme { name: String, available: String },
}

/// Named ticker groups. Serialized as a flat TOML table:
///
/// ```toml
/// index = ["SPY", "QQQ"]
/// tech = ["AAPL", "MSFT"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Universe {
    pub themes: BTreeMap<String, Vec<Symbol>>,
}

impl Universe {
    /// Built-in universe: a handful of liquid large caps per theme, plus the
    /// index ETFs so the default benchmark always has a series.
    pub fn builtin() -> Self {
        let themes = [
            ("index", vec!["SPY", "QQQ", "IWM", "DIA"]),
            ("tech", vec!["AAPL", "MSFT", "NVDA", "AMZN", "GOOGL", "META"]),
            ("finance", vec!["JPM", "BAC", "GS", "V"]),
            ("energy", vec!["XOM", "CVX", "SLB"]),
            ("health", vec!["JNJ", "UNH", "LLY"]),
        ];
        Self {
            themes: themes
                .into_iter()
                .map(|(name, tickers)| {
                    (
                        name.to_string(),
                        tickers.into_iter().map(str::to_string).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Parse a universe from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let text = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Theme names in sorted order.
    pub fn theme_names(&self) -> Vec<&str> {
        self.themes.keys().map(String::as_str).collect()
    }

    /// Resolve the ticker list for a scan: one theme, or the deduplicated
    /// union of every theme. Output is sorted.
    pub fn tickers(&self, theme: Option<&str>) -> Result<Vec<Symbol>, UniverseError> {
        match theme {
            Some(name) => self
                .themes
                .get(name)
                .map(|tickers| {
                    let mut out = tickers.clone();
                    out.sort();
                    out.dedup();
                    out
                })
                .ok_or_else(|| UniverseError::UnknownTheme {
                    name: name.to_string(),
                    available: self.theme_names().join(", "),
                }),
            None => {
                let mut out: Vec<Symbol> = self.themes.values().flatten().cloned().collect();
                out.sort();
                out.dedup();
                Ok(out)
            }
        }
    }

    /// Total distinct tickers across all themes.
    pub fn len(&self) -> usize {
        self.tickers(None).map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.themes.values().all(|t| t.is_empty())
    }
}
