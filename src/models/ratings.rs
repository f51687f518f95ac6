use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A star rating in `MIN_RATING..=MAX_RATING`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rating(i32);

impl Rating {
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(DomainError::Validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        Ok(Rating(value))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// Arithmetic mean rounded to two decimals, `None` when nothing was rated.
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }

    let total: i64 = ratings.iter().map(|r| *r as i64).sum();
    let mean = total as f64 / ratings.len() as f64;

    Some((mean * 100.0).round() / 100.0)
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RatedRide {
    pub ride_id: i64,
    pub rating: i32,
    pub review: Option<String>,
    pub destination: String,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(Rating::new(1).unwrap().value(), 1);
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert!(matches!(Rating::new(0), Err(DomainError::Validation(_))));
        assert!(matches!(Rating::new(6), Err(DomainError::Validation(_))));
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[4]), Some(4.0));
        assert_eq!(average_rating(&[5, 4, 4]), Some(4.33));
        assert_eq!(average_rating(&[5, 5, 4]), Some(4.67));
        assert_eq!(average_rating(&[1, 2]), Some(1.5));
    }
}
