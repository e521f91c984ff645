use crate::core::similarity::similarity_ratio;
use crate::models::RawListing;

/// Name and address must both be strictly above this ratio to count as a duplicate
pub const DUPLICATE_THRESHOLD: f64 = 0.9;

/// Whether two listings describe the same business
///
/// Compares lower-cased names and lower-cased vicinities independently.
pub fn is_duplicate(candidate: &RawListing, seen: &RawListing) -> bool {
    let name_similarity = similarity_ratio(
        &candidate.name.to_lowercase(),
        &seen.name.to_lowercase(),
    );
    if name_similarity <= DUPLICATE_THRESHOLD {
        return false;
    }

    let address_similarity = similarity_ratio(
        &candidate.vicinity.to_lowercase(),
        &seen.vicinity.to_lowercase(),
    );
    address_similarity > DUPLICATE_THRESHOLD
}

/// Drop near-identical listings, keeping the first occurrence of each business
///
/// Duplicates are discarded entirely; fields are never merged. Quadratic in
/// the number of listings, which is fine for search results capped at 50.
pub fn merge_listings(listings: Vec<RawListing>) -> Vec<RawListing> {
    let mut unique: Vec<RawListing> = Vec::with_capacity(listings.len());

    for listing in listings {
        if unique.iter().any(|seen| is_duplicate(&listing, seen)) {
            tracing::debug!("Dropping duplicate listing: {} ({})", listing.name, listing.place_id);
            continue;
        }
        unique.push(listing);
    }

    unique
}
