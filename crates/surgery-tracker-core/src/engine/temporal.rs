//! Day counting and urgency tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Timestamp;

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days elapsed since `timestamp`, relative to the current time.
pub fn days_since(timestamp: &Timestamp) -> u32 {
    days_since_at(timestamp, Utc::now())
}

/// Whole days elapsed since `timestamp`, relative to `now`.
///
/// Unusable input and future timestamps count as 0 days.
pub fn days_since_at(timestamp: &Timestamp, now: DateTime<Utc>) -> u32 {
    let Some(ts) = timestamp.epoch_millis() else {
        return 0;
    };

    let elapsed = now.timestamp_millis().saturating_sub(ts);
    if elapsed <= 0 {
        return 0;
    }

    u32::try_from(elapsed / MS_PER_DAY).unwrap_or(u32::MAX)
}

/// Staleness tier of a patient's reference timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Under 30 days
    Normal,
    /// 30 to 44 days (yellow)
    Amarelo,
    /// 45 to 59 days (orange)
    Laranja,
    /// 60 days or more (red)
    Vermelho,
}

impl Urgency {
    /// Classify a day count. Upper bounds are inclusive: 29, 44 and 59 stay
    /// in the lower tier.
    pub fn classify(days: u32) -> Self {
        match days {
            0..=29 => Urgency::Normal,
            30..=44 => Urgency::Amarelo,
            45..=59 => Urgency::Laranja,
            _ => Urgency::Vermelho,
        }
    }

    /// Classify an optional day count; `None` is [`Urgency::Normal`].
    pub fn classify_opt(days: Option<u32>) -> Self {
        days.map(Self::classify).unwrap_or(Urgency::Normal)
    }

    /// Sort rank, higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Urgency::Vermelho => 4,
            Urgency::Laranja => 3,
            Urgency::Amarelo => 2,
            Urgency::Normal => 1,
        }
    }

    /// Lowercase name used by the dashboard styles.
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Amarelo => "amarelo",
            Urgency::Laranja => "laranja",
            Urgency::Vermelho => "vermelho",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_one_day_ago() {
        let ts = Timestamp::from(now() - Duration::days(1));
        assert_eq!(days_since_at(&ts, now()), 1);
    }

    #[test]
    fn test_partial_days_floor() {
        let ts = Timestamp::from(now() - Duration::hours(47));
        assert_eq!(days_since_at(&ts, now()), 1);
    }

    #[test]
    fn test_missing_zero_negative() {
        assert_eq!(days_since_at(&Timestamp::Missing, now()), 0);
        assert_eq!(days_since_at(&Timestamp::Epoch(0), now()), 0);
        assert_eq!(days_since_at(&Timestamp::Epoch(-100), now()), 0);
    }

    #[test]
    fn test_future_clamps_to_zero() {
        let ts = Timestamp::from(now() + Duration::days(3));
        assert_eq!(days_since_at(&ts, now()), 0);
    }

    #[test]
    fn test_text_inputs() {
        let digits = Timestamp::Text((now() - Duration::days(10)).timestamp_millis().to_string());
        assert_eq!(days_since_at(&digits, now()), 10);

        assert_eq!(days_since_at(&Timestamp::from("2026-10-09"), now()), 10);
        assert_eq!(days_since_at(&Timestamp::from("semana passada"), now()), 0);
    }

    #[test]
    fn test_days_since_uses_wall_clock() {
        let ts = Timestamp::from(Utc::now() - Duration::days(2));
        assert_eq!(days_since(&ts), 2);
    }

    #[test]
    fn test_urgency_boundaries() {
        assert_eq!(Urgency::classify(0), Urgency::Normal);
        assert_eq!(Urgency::classify(29), Urgency::Normal);
        assert_eq!(Urgency::classify(30), Urgency::Amarelo);
        assert_eq!(Urgency::classify(44), Urgency::Amarelo);
        assert_eq!(Urgency::classify(45), Urgency::Laranja);
        assert_eq!(Urgency::classify(59), Urgency::Laranja);
        assert_eq!(Urgency::classify(60), Urgency::Vermelho);
        assert_eq!(Urgency::classify(u32::MAX), Urgency::Vermelho);
        assert_eq!(Urgency::classify_opt(None), Urgency::Normal);
    }

    #[test]
    fn test_rank_order() {
        assert!(Urgency::Vermelho.rank() > Urgency::Laranja.rank());
        assert!(Urgency::Laranja.rank() > Urgency::Amarelo.rank());
        assert!(Urgency::Amarelo.rank() > Urgency::Normal.rank());
        assert_eq!(serde_json::to_string(&Urgency::Laranja).unwrap(), r#""laranja""#);
    }
}
