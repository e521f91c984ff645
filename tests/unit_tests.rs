// Unit tests for Lead Qualifier

use chrono::{Duration, TimeZone, Utc};
use lead_qualifier::core::{
    dedup::{is_duplicate, merge_listings},
    distance::{distance_between, haversine_distance},
    reviews::{parse_review_time, ReviewCriteria},
    scoring::{proximity_score, Grader},
    sentiment::{LexiconScorer, PolarityScorer},
    similarity::similarity_ratio,
};
use lead_qualifier::models::{BusinessDetails, GradingWeights, LatLng, RawListing, ReviewRecord};

fn review(text: &str, rating: f64, created_at: &str) -> ReviewRecord {
    ReviewRecord {
        text: text.to_string(),
        rating,
        created_at: created_at.to_string(),
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(-33.8688, 151.2093, -33.8688, 151.2093);
    assert_eq!(distance, 0.0);
}

#[test]
fn test_haversine_distance_sydney_to_parramatta() {
    // Sydney CBD to Parramatta is roughly 19-20 km
    let distance = haversine_distance(-33.8688, 151.2093, -33.8150, 151.0011);
    assert!(distance > 18.0 && distance < 21.0, "got {}", distance);
}

#[test]
fn test_one_degree_of_longitude_at_equator() {
    let distance = distance_between(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
    assert!((distance - 111.19).abs() < 0.01, "got {}", distance);
}

#[test]
fn test_similarity_ratio_known_values() {
    assert_eq!(similarity_ratio("", ""), 1.0);
    assert_eq!(similarity_ratio("abc", ""), 0.0);
    assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
    assert!((similarity_ratio("joe's pizza", "joes pizza") - 20.0 / 21.0).abs() < 1e-12);
}

#[test]
fn test_duplicate_requires_name_and_address() {
    let a = RawListing::new("Joe's Pizza", "12 Main St", "a");
    let same = RawListing::new("Joes Pizza", "12 Main St", "b");
    let elsewhere = RawListing::new("Joe's Pizza", "98 Harbour Rd", "c");

    assert!(is_duplicate(&same, &a));
    assert!(!is_duplicate(&elsewhere, &a));
}

#[test]
fn test_merge_keeps_first_occurrence() {
    let listings = vec![
        RawListing::new("Brush Bros Painting", "5 King St", "first"),
        RawListing::new("Coastal Roofing", "1 Beach Rd", "other"),
        RawListing::new("brush bros painting", "5 king st", "second"),
    ];

    let unique = merge_listings(listings);
    let ids: Vec<&str> = unique.iter().map(|l| l.place_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "other"]);
}

#[test]
fn test_parse_review_time_formats() {
    assert!(parse_review_time("2024-03-01T10:00:00+11:00").is_some());
    assert!(parse_review_time("2024-03-01T10:00:00+1100").is_some());
    assert!(parse_review_time("2024-03-01T10:00:00Z").is_some());
    assert!(parse_review_time("last tuesday").is_none());
}

#[test]
fn test_reviews_qualify_when_recent_positive_and_well_rated() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let reviews = vec![
        review("Great work, very friendly", 5.0, "2024-05-20T09:00:00+00:00"),
        review("Good and reliable", 4.0, "2024-04-02T09:00:00+00:00"),
    ];

    assert!(ReviewCriteria::default().qualifies_at(&reviews, now, &LexiconScorer));
}

#[test]
fn test_old_reviews_do_not_count() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let stale = (now - Duration::days(400)).to_rfc3339();
    let reviews = vec![review("Excellent", 5.0, &stale)];

    assert!(!ReviewCriteria::default().qualifies_at(&reviews, now, &LexiconScorer));
}

#[test]
fn test_low_rating_or_negative_sentiment_fails() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let criteria = ReviewCriteria::default();

    let low_rating = vec![review("Great", 3.0, "2024-05-01T00:00:00Z")];
    assert!(!criteria.qualifies_at(&low_rating, now, &LexiconScorer));

    let negative = vec![review("Terrible and rude", 5.0, "2024-05-01T00:00:00Z")];
    assert!(!criteria.qualifies_at(&negative, now, &LexiconScorer));
}

#[test]
fn test_lexicon_polarity_sign() {
    let scorer = LexiconScorer;
    assert!(scorer.polarity("Excellent, highly recommend").unwrap() > 0.0);
    assert!(scorer.polarity("awful experience").unwrap() < 0.0);
    assert!(scorer.polarity("not good").unwrap() < 0.0);
    assert_eq!(scorer.polarity("the van arrived"), Some(0.0));
    assert_eq!(scorer.polarity("   "), None);
}

#[test]
fn test_proximity_score_bounds() {
    assert_eq!(proximity_score(0.0, 50.0), 10.0);
    assert_eq!(proximity_score(25.0, 50.0), 5.0);
    assert_eq!(proximity_score(80.0, 50.0), 0.0);
    assert_eq!(proximity_score(1.0, 0.0), 0.0);
}

#[test]
fn test_grade_stays_within_weight_total() {
    let grader = Grader::new(vec!["plumber".to_string()], 50.0, LatLng::new(-33.8688, 151.2093));

    let details = BusinessDetails {
        website: Some("https://pipes.test".to_string()),
        rating: 4.2,
        user_ratings_total: 37,
        price_level: 2,
        types: vec!["plumber".to_string()],
        location: Some(LatLng::new(-33.80, 151.10)),
        ..Default::default()
    };

    let (score, distance) = grader.grade(&details);
    assert!(score > 0.0 && score <= GradingWeights::default().total());
    assert!(distance > 0.0 && distance < 50.0);
}

#[test]
fn test_website_adds_its_weight() {
    let grader = Grader::new(vec![], 50.0, LatLng::default());
    let without = BusinessDetails::default();
    let with = BusinessDetails {
        website: Some("https://example.test".to_string()),
        ..Default::default()
    };

    let delta = grader.grade(&with).0 - grader.grade(&without).0;
    assert!((delta - GradingWeights::default().website).abs() < 1e-9);
}
