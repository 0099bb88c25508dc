//! Claims carried by admin session tokens.

use crate::error::BiscuitError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Claims minted into an admin token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Directory account the token is issued to.
    pub user_id: i32,

    /// When the token was minted.
    pub issued_at: DateTime<Utc>,

    /// When the token stops verifying.
    pub expires_at: DateTime<Utc>,
}

impl AdminClaims {
    /// Claims for `user_id`, valid for `lifetime` from now.
    pub fn new(user_id: i32, lifetime: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            user_id,
            issued_at,
            expires_at: issued_at + lifetime,
        }
    }
}

/// Parse a duration string like "24h", "7d", "30m", "90s" into a chrono Duration.
///
/// A bare number is read as hours.
pub fn parse_duration(s: &str) -> Result<Duration, BiscuitError> {
    let s = s.trim().to_lowercase();
    let invalid = || BiscuitError::InvalidDuration(s.clone());

    let (digits, unit): (&str, fn(i64) -> Duration) = if let Some(d) = s.strip_suffix('d') {
        (d, Duration::days)
    } else if let Some(h) = s.strip_suffix('h') {
        (h, Duration::hours)
    } else if let Some(m) = s.strip_suffix('m') {
        (m, Duration::minutes)
    } else if let Some(sec) = s.strip_suffix('s') {
        (sec, Duration::seconds)
    } else {
        (s.as_str(), Duration::hours)
    };

    let value: i64 = digits.trim().parse().map_err(|_| invalid())?;
    if value <= 0 {
        return Err(invalid());
    }
    Ok(unit(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("24h").unwrap(), Duration::hours(24));
        assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_duration("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_duration("90S").unwrap(), Duration::seconds(90));
        assert_eq!(parse_duration("3").unwrap(), Duration::hours(3));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("0h").is_err());
        assert!(parse_duration("-1d").is_err());
    }

    #[test]
    fn test_claims_expiry() {
        let claims = AdminClaims::new(7, Duration::hours(1));
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.expires_at - claims.issued_at, Duration::hours(1));
    }
}
