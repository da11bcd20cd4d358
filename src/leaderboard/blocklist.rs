/// Token addresses excluded from leaderboard aggregation (native wrappers,
/// stablecoins). Comparisons are case-insensitive for EVM-style (`0x...`)
/// addresses and case-sensitive for account-based chains (Solana and
/// friends), since the latter's base58 alphabet is case-significant.
#[derive(Debug, Clone, Default)]
pub struct TokenBlocklist {
    entries: Vec<String>,
}

impl TokenBlocklist {
    pub fn new(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn contains(&self, token_address: &str) -> bool {
        if is_evm_address(token_address) {
            self.entries.iter().any(|e| e.eq_ignore_ascii_case(token_address))
        } else {
            self.entries.iter().any(|e| e == token_address)
        }
    }
}

fn is_evm_address(address: &str) -> bool {
    address.starts_with("0x") || address.starts_with("0X")
}
