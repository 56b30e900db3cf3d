/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Start of the UTC day containing `millis`, in milliseconds
pub fn day_start_millis(millis: i64) -> i64 {
    const DAY_MS: i64 = 86_400_000;
    millis - millis.rem_euclid(DAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_are_positive_and_ordered_by_time() {
        let a = snowflake_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = snowflake_id();
        assert!(a > 0);
        assert!(b > a);
        assert!(b < (1_i64 << 53));
    }

    #[test]
    fn day_start_truncates_to_midnight() {
        // 2024-03-10 15:30:00 UTC
        let ts = 1_710_084_600_000;
        assert_eq!(day_start_millis(ts), 1_710_028_800_000);
        assert_eq!(day_start_millis(1_710_028_800_000), 1_710_028_800_000);
    }
}
