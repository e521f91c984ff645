use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::sentiment::{LexiconScorer, PolarityScorer};
use crate::models::ReviewRecord;

/// Thresholds a business's recent reviews must meet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewCriteria {
    pub min_recent_reviews: usize,
    pub min_average_rating: f64,
    pub min_average_sentiment: f64,
    pub recent_window_days: i64,
}

impl Default for ReviewCriteria {
    fn default() -> Self {
        Self {
            min_recent_reviews: 1,
            min_average_rating: 3.5,
            min_average_sentiment: 0.0,
            recent_window_days: 365,
        }
    }
}

/// Parse a review timestamp, keeping its own UTC offset
///
/// Accepts RFC 3339 and the colon-less `+HHMM` offset form.
pub fn parse_review_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

impl ReviewCriteria {
    /// Whether `reviews` pass every gate as of the current time
    /// Longest accepted recency window, a century
    pub const MAX_WINDOW_DAYS: i64 = 36_500;

    /// Reject windows outside `0..=MAX_WINDOW_DAYS` and non-finite minimums
    pub fn validate(&self) -> Result<(), String> {
        if !(0..=Self::MAX_WINDOW_DAYS).contains(&self.recent_window_days) {
            return Err(format!(
                "recent_window_days must be between 0 and {}, got {}",
                Self::MAX_WINDOW_DAYS,
                self.recent_window_days
            ));
        }
        if !self.min_average_rating.is_finite() || !self.min_average_sentiment.is_finite() {
            return Err("review minimums must be finite numbers".to_string());
        }
        Ok(())
    }

    pub fn qualifies(&self, reviews: &[ReviewRecord]) -> bool {
        self.qualifies_at(reviews, Utc::now(), &LexiconScorer)
    }

    /// Whether `reviews` pass every gate as of `now`
    ///
    /// Gates, cheapest first: enough recent reviews, average rating, average
    /// sentiment. Reviews with unparsable timestamps are not recent.
    pub fn qualifies_at(
        &self,
        reviews: &[ReviewRecord],
        now: DateTime<Utc>,
        scorer: &dyn PolarityScorer,
    ) -> bool {
        if reviews.is_empty() {
            return false;
        }

        // an out-of-range window counts every review as recent
        let cutoff = Duration::try_days(self.recent_window_days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let recent: Vec<&ReviewRecord> = reviews
            .iter()
            .filter(|review| {
                parse_review_time(&review.created_at)
                    .map(|created| created.with_timezone(&Utc) >= cutoff)
                    .unwrap_or(false)
            })
            .collect();

        if recent.is_empty() || recent.len() < self.min_recent_reviews {
            return false;
        }

        let count = recent.len() as f64;
        let average_rating = recent.iter().map(|r| r.rating).sum::<f64>() / count;
        if average_rating < self.min_average_rating {
            return false;
        }

        let average_sentiment = recent
            .iter()
            .map(|r| scorer.polarity(&r.text).unwrap_or(0.0))
            .sum::<f64>()
            / count;
        if average_sentiment < self.min_average_sentiment {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(text: &str, rating: f64, created_at: &str) -> ReviewRecord {
        ReviewRecord {
            text: text.to_string(),
            rating,
            created_at: created_at.to_string(),
        }
    }

    fn days_ago(days: i64) -> String {
        (Utc::now() - Duration::days(days)).to_rfc3339()
    }

    #[test]
    fn test_empty_reviews_fail() {
        assert!(!ReviewCriteria::default().qualifies(&[]));
    }

    #[test]
    fn test_recent_positive_reviews_pass() {
        let reviews = vec![
            review("Great job, very friendly", 5.0, &days_ago(0)),
            review("Arrived on time", 5.0, &days_ago(0)),
        ];
        assert!(ReviewCriteria::default().qualifies(&reviews));
    }

    #[test]
    fn test_old_reviews_fail_regardless_of_rating() {
        let reviews = vec![
            review("Excellent work", 5.0, &days_ago(400)),
            review("Perfect", 5.0, &days_ago(800)),
        ];
        assert!(!ReviewCriteria::default().qualifies(&reviews));
    }

    #[test]
    fn test_malformed_timestamps_are_not_recent() {
        let reviews = vec![
            review("Excellent work", 5.0, "yesterday"),
            review("Great", 5.0, ""),
        ];
        assert!(!ReviewCriteria::default().qualifies(&reviews));
    }

    #[test]
    fn test_low_average_rating_fails() {
        let reviews = vec![
            review("Great", 5.0, &days_ago(10)),
            review("Good", 1.0, &days_ago(20)),
        ];
        assert!(!ReviewCriteria::default().qualifies(&reviews));
    }

    #[test]
    fn test_negative_sentiment_fails() {
        let reviews = vec![review("Terrible, rude and late", 4.0, &days_ago(5))];
        assert!(!ReviewCriteria::default().qualifies(&reviews));
    }

    #[test]
    fn test_min_recent_reviews_gate() {
        let criteria = ReviewCriteria {
            min_recent_reviews: 3,
            ..Default::default()
        };
        let reviews = vec![
            review("Great", 5.0, &days_ago(1)),
            review("Great", 5.0, &days_ago(2)),
            review("Great", 5.0, &days_ago(500)),
        ];
        assert!(!criteria.qualifies(&reviews));
    }

    #[test]
    fn test_only_recent_reviews_are_averaged() {
        // the stale one-star review must not drag the average down
        let reviews = vec![
            review("Good", 5.0, &days_ago(3)),
            review("Awful", 1.0, &days_ago(700)),
        ];
        assert!(ReviewCriteria::default().qualifies(&reviews));
    }

    #[test]
    fn test_fixed_now_and_offsets() {
        let now = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let reviews = vec![review("Good", 4.0, "2023-06-03T09:00:00+1000")];
        assert!(ReviewCriteria::default().qualifies_at(&reviews, now, &LexiconScorer));

        let stale = vec![review("Good", 4.0, "2023-05-01T09:00:00+10:00")];
        assert!(!ReviewCriteria::default().qualifies_at(&stale, now, &LexiconScorer));
    }

    #[test]
    fn test_parse_review_time_formats() {
        assert!(parse_review_time("2024-01-02T03:04:05Z").is_some());
        assert!(parse_review_time("2024-01-02T03:04:05+05:30").is_some());
        assert!(parse_review_time("2024-01-02T03:04:05-0800").is_some());
        assert!(parse_review_time("02/01/2024").is_none());
    }

    #[test]
    fn test_window_bounds_validated() {
        assert!(ReviewCriteria::default().validate().is_ok());

        let criteria = ReviewCriteria { recent_window_days: -1, ..Default::default() };
        assert!(criteria.validate().is_err());

        let criteria = ReviewCriteria { recent_window_days: i64::MAX, ..Default::default() };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_huge_window_does_not_panic() {
        let criteria = ReviewCriteria { recent_window_days: i64::MAX, ..Default::default() };
        let reviews = vec![review("Great", 5.0, "2001-01-01T00:00:00Z")];
        assert!(criteria.qualifies_at(&reviews, Utc::now(), &LexiconScorer));
    }
}
