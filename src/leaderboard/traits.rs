use async_trait::async_trait;

/// Token metadata needed for the leaderboard's top-10 detail refresh.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub symbol: String,
    pub logo: String,
}

/// External collaborator: symbol/logo lookups for the leaderboard's detail
/// view. Backed by an external token catalog service in production.
#[async_trait]
pub trait TokenCatalog: Send + Sync {
    async fn lookup(&self, chain: &str, token_address: &str) -> Option<TokenInfo>;
}
