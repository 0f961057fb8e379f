//! Pagination bounds shared by list endpoints.

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 500;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, DEFAULT_LIMIT, MAX_LIMIT), DEFAULT_LIMIT);
    }

    #[test]
    fn clamp_limit_respects_bounds() {
        assert_eq!(clamp_limit(Some(10_000), 20, 100), 100);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(Some(-3)), 0);
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
