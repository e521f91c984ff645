use crate::core::{distance::distance_between, reviews::ReviewCriteria};
use crate::models::{BusinessDetails, GradingWeights, LatLng};

/// Upper bound of every criterion's sub-score
const MAX_SUB_SCORE: f64 = 10.0;

/// Rating count at which the popularity sub-score saturates
const RATINGS_SATURATION: f64 = 100.0;

/// Individual 0-10 sub-scores before weighting
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub rating: f64,
    pub user_ratings_total: f64,
    pub reviews: f64,
    pub website: f64,
    pub phone: f64,
    pub price_level: f64,
    pub types: f64,
    pub location_proximity: f64,
}

impl ScoreBreakdown {
    /// Weighted total as a percentage
    ///
    /// Each sub-score contributes `sub_score * weight / 100`, and the sum is
    /// multiplied by 10. A criterion weighted 100 and fully satisfied thus
    /// adds 10 points.
    pub fn weighted_total(&self, weights: &GradingWeights) -> f64 {
        let weighted = [
            (self.rating, weights.rating),
            (self.user_ratings_total, weights.user_ratings_total),
            (self.reviews, weights.reviews),
            (self.website, weights.website),
            (self.phone, weights.phone),
            (self.price_level, weights.price_level),
            (self.types, weights.types),
            (self.location_proximity, weights.location_proximity),
        ]
        .iter()
        .map(|(score, weight)| score * weight / 100.0)
        .sum::<f64>();

        weighted * 10.0
    }
}

/// Grades enriched businesses against one search's configuration
#[derive(Debug, Clone)]
pub struct Grader {
    pub target_types: Vec<String>,
    pub max_distance_km: f64,
    pub base_location: LatLng,
    pub weights: GradingWeights,
    pub review_criteria: ReviewCriteria,
}

impl Grader {
    pub fn new(target_types: Vec<String>, max_distance_km: f64, base_location: LatLng) -> Self {
        Self {
            target_types,
            max_distance_km,
            base_location,
            weights: GradingWeights::default(),
            review_criteria: ReviewCriteria::default(),
        }
    }

    pub fn with_weights(mut self, weights: GradingWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_review_criteria(mut self, criteria: ReviewCriteria) -> Self {
        self.review_criteria = criteria;
        self
    }

    /// Score (0-100 under weights summing to 100) and distance from the base location
    pub fn grade(&self, details: &BusinessDetails) -> (f64, f64) {
        let (breakdown, distance_km) = self.breakdown(details);
        (breakdown.weighted_total(&self.weights), distance_km)
    }

    /// Unweighted sub-scores plus the distance in kilometers
    pub fn breakdown(&self, details: &BusinessDetails) -> (ScoreBreakdown, f64) {
        // An unknown location is graded as (0, 0)
        let location = details.location.unwrap_or_default();
        let distance_km = distance_between(self.base_location, location);

        let breakdown = ScoreBreakdown {
            rating: (details.rating / 5.0) * MAX_SUB_SCORE,
            user_ratings_total: ((details.user_ratings_total as f64 / RATINGS_SATURATION)
                * MAX_SUB_SCORE)
                .min(MAX_SUB_SCORE),
            reviews: presence_score(self.review_criteria.qualifies(&details.reviews)),
            website: presence_score(details.website.is_some()),
            phone: presence_score(details.phone.is_some()),
            price_level: (details.price_level as f64 / 4.0) * MAX_SUB_SCORE,
            types: presence_score(self.matches_target_type(&details.types)),
            location_proximity: proximity_score(distance_km, self.max_distance_km),
        };

        (breakdown, distance_km)
    }

    fn matches_target_type(&self, types: &[String]) -> bool {
        self.target_types.iter().any(|target| {
            let target = target.to_lowercase();
            types
                .iter()
                .any(|business_type| business_type.to_lowercase() == target)
        })
    }
}

#[inline]
fn presence_score(present: bool) -> f64 {
    if present {
        MAX_SUB_SCORE
    } else {
        0.0
    }
}

/// Linear falloff from 10 at the base location to 0 at `max_distance_km`
///
/// A non-positive maximum always scores 0.
#[inline]
pub fn proximity_score(distance_km: f64, max_distance_km: f64) -> f64 {
    if max_distance_km > 0.0 {
        (MAX_SUB_SCORE - (distance_km / max_distance_km) * MAX_SUB_SCORE).max(0.0)
    } else {
        0.0
    }
}
