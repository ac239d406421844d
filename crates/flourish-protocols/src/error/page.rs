//! Composer page errors.

use thiserror::Error;

/// Errors from a composer page backend.
#[derive(Debug, Error)]
pub enum PageError {
    /// Browser endpoint not reachable.
    #[error("Browser not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    BrowserNotAvailable(String),

    /// Transport-level connection failure.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Protocol-level error reported by the browser.
    #[error("Protocol error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// The targeted editable region no longer exists in the page.
    #[error("Region {0} is gone")]
    RegionGone(u64),

    /// In-page script evaluation failed.
    #[error("Script error: {0}")]
    Script(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The page connection was closed.
    #[error("Page closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_not_available_mentions_debug_port() {
        let err = PageError::BrowserNotAvailable("http://localhost:9222".to_string());
        assert!(err.to_string().contains("remote-debugging-port"));
    }

    #[test]
    fn test_region_gone_display() {
        let err = PageError::RegionGone(42);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: PageError = parse_err.into();
        assert!(matches!(err, PageError::Serialization(_)));
    }
}
