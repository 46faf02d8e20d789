use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ModelError;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Job code. Unique and immutable once the posting collaborator issues it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ModelError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(ModelError::InvalidLocation {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle (haversine) distance in statute miles.
    pub fn distance_miles(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
    }
}

/// Compensation range. Invariant: `0 < min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPayRange")]
pub struct PayRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawPayRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawPayRange> for PayRange {
    type Error = ModelError;

    fn try_from(raw: RawPayRange) -> Result<Self, Self::Error> {
        PayRange::new(raw.min, raw.max)
    }
}

impl PayRange {
    pub fn new(min: f64, max: f64) -> Result<Self, ModelError> {
        // NaN fails both comparisons and lands here too.
        if !(min > 0.0 && max > 0.0) {
            return Err(ModelError::NonPositivePay { min, max });
        }
        if min > max {
            return Err(ModelError::InvertedPay { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// A posted job, handed to the pipeline by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub desired_skills: Vec<String>,
    pub pay_range: PayRange,
    /// Where the posting came from (job board, employer referral, ...).
    pub source: String,
    pub posted_by: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_is_trimmed() {
        assert_eq!(JobId::new("  787dd505 ").as_str(), "787dd505");
    }

    #[test]
    fn test_pay_range_rejects_inverted_bounds() {
        assert_eq!(
            PayRange::new(30.0, 20.0),
            Err(ModelError::InvertedPay {
                min: 30.0,
                max: 20.0
            })
        );
    }

    #[test]
    fn test_pay_range_rejects_zero() {
        assert!(matches!(
            PayRange::new(0.0, 20.0),
            Err(ModelError::NonPositivePay { .. })
        ));
        assert!(PayRange::new(f64::NAN, 20.0).is_err());
    }

    #[test]
    fn test_pay_range_accepts_equal_bounds() {
        let range = PayRange::new(22.5, 22.5).unwrap();
        assert_eq!(range.min(), range.max());
    }

    #[test]
    fn test_pay_range_deserialize_validates() {
        let err = serde_json::from_str::<PayRange>(r#"{"min": 40, "max": 10}"#);
        assert!(err.is_err());
        let ok: PayRange = serde_json::from_str(r#"{"min": 10, "max": 40}"#).unwrap();
        assert_eq!(ok.max(), 40.0);
    }

    #[test]
    fn test_distance_des_moines_to_iowa_city() {
        let des_moines = GeoPoint::new(41.5868, -93.6250).unwrap();
        let iowa_city = GeoPoint::new(41.6611, -91.5302).unwrap();
        let miles = des_moines.distance_miles(&iowa_city);
        assert!((miles - 108.0).abs() < 3.0, "Distance was {miles}");
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(10.0, 20.0).unwrap();
        assert!(p.distance_miles(&p) < 1e-9);
    }

    #[test]
    fn test_geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
    }
}
