//! Wallet addresses and the wallet list file.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A wallet address, normalized to trimmed lower case.
///
/// Addresses are opaque to the checker; no checksum or format validation is
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wallet(String);

impl Wallet {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Wallet {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Parse a wallet list: one address per line, blank lines skipped,
/// duplicates dropped (first occurrence kept).
pub fn parse_wallets(content: &str) -> Vec<Wallet> {
    let mut seen = HashSet::new();
    let mut wallets = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let wallet = Wallet::new(line);
        if seen.insert(wallet.clone()) {
            wallets.push(wallet);
        } else {
            tracing::warn!(line = line_no + 1, wallet = %wallet, "Duplicate wallet ignored");
        }
    }

    wallets
}

/// Load the wallet list from a file.
pub fn load_wallets(path: &Path) -> std::io::Result<Vec<Wallet>> {
    let content = std::fs::read_to_string(path)?;
    let wallets = parse_wallets(&content);
    tracing::info!(count = wallets.len(), path = %path.display(), "Wallets loaded");
    Ok(wallets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(Wallet::new("  0xABCdef \r").as_str(), "0xabcdef");
    }

    #[test]
    fn test_parse_skips_blanks_and_duplicates() {
        let wallets = parse_wallets("0xAA\n\n0xbb\n0xaa\n   \n0xCC\n");
        let addrs: Vec<_> = wallets.iter().map(Wallet::as_str).collect();
        assert_eq!(addrs, vec!["0xaa", "0xbb", "0xcc"]);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Wallet::new("0xA")).unwrap();
        assert_eq!(json, "\"0xa\"");
    }
}
