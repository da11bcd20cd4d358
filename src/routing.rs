//! Stable routing-key hashing shared by the dispatcher and the batch writer.
//!
//! Both subsystems need the same guarantee — identical keys always land in
//! the same shard — so the hash lives in one place instead of being
//! reimplemented twice.

/// Returns the shard index for `routing_key` among `shard_count` shards.
///
/// `shard_count` must be non-zero; callers own that invariant (it comes
/// from startup configuration, never from the hot path).
pub fn shard_for(routing_key: &str, shard_count: usize) -> usize {
    let checksum = crc32fast::hash(routing_key.as_bytes());
    (checksum as usize) % shard_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_always_same_shard() {
        let a = shard_for("BSC:0xabc:0xdef", 8);
        let b = shard_for("BSC:0xabc:0xdef", 8);
        assert_eq!(a, b);
    }

    #[test]
    fn distributes_across_shards() {
        let shards: std::collections::HashSet<usize> = (0..1000)
            .map(|i| shard_for(&format!("wallet-{i}"), 4))
            .collect();
        assert!(shards.len() > 1, "expected keys to spread across shards");
    }
}
