//! Portfolio seed loading.

use std::path::Path;

use anyhow::Context;
use cabinet_core::ingest::parse_portfolio_json;
use cabinet_core::store::Portfolio;

/// Sample portfolio compiled into the binary.
pub const EMBEDDED_SEED: &str = include_str!("../seed/portfolio.json");

/// Build a portfolio from a seed document.
pub fn portfolio_from_json(json: &str) -> anyhow::Result<Portfolio> {
    let seed = parse_portfolio_json(json).context("Invalid portfolio seed")?;
    Portfolio::from_seed(seed).context("Inconsistent portfolio seed")
}

/// Load the seed from `path`, or the embedded sample when `None`.
pub fn load_portfolio(path: Option<&Path>) -> anyhow::Result<Portfolio> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read seed file {}", path.display()))?;
            portfolio_from_json(&json)
        }
        None => portfolio_from_json(EMBEDDED_SEED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_seed_is_consistent() {
        let portfolio = load_portfolio(None).unwrap();
        assert_eq!(portfolio.collaborators.len(), 4);
        assert_eq!(portfolio.managers.len(), 3);
        assert_eq!(portfolio.prospects.snapshot().items.len(), 3);
        assert_eq!(portfolio.assignments.snapshot().items.len(), 10);
    }

    #[test]
    fn missing_seed_file_is_an_error() {
        let err = load_portfolio(Some(Path::new("/nonexistent/seed.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read seed file"));
    }
}
