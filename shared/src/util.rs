/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Normalize an item name for cross-ledger matching (trimmed, lower-cased).
pub fn normalize_item_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_item_name() {
        assert_eq!(normalize_item_name("  Roma Tomatoes "), "roma tomatoes");
        assert_eq!(normalize_item_name("SALMON"), "salmon");
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2024-01-01 UTC
        assert!(now_millis() > 1_704_067_200_000);
    }
}
