//! Wall-clock access.

/// Current time in Unix epoch seconds (UTC).
#[must_use]
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_now_is_after_2024() {
        assert!(unix_now() > 1_704_067_200);
    }
}
