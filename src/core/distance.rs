use crate::core::signal::Signal;
use crate::models::Location;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance bands as (upper bound in km, score); beyond the last band scores 0.1
const DISTANCE_BANDS: [(f64, f64); 4] = [(100.0, 0.9), (500.0, 0.7), (2000.0, 0.5), (5000.0, 0.3)];
const FAR_SCORE: f64 = 0.1;

const SAME_CITY_SCORE: f64 = 1.0;
const SAME_COUNTRY_SCORE: f64 = 0.7;
const DIFFERENT_COUNTRY_SCORE: f64 = 0.2;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Map a great-circle distance onto the proximity bands
#[inline]
pub fn distance_band_score(distance_km: f64) -> f64 {
    DISTANCE_BANDS
        .iter()
        .find(|(limit, _)| distance_km < *limit)
        .map_or(FAR_SCORE, |(_, score)| *score)
}

/// Proximity of two declared locations
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoScorer;

impl GeoScorer {
    /// Proximity in [0, 1]; missing or unusable data yields the neutral 0.5
    pub fn proximity(&self, a: Option<&Location>, b: Option<&Location>) -> f64 {
        self.score(a, b).or_neutral()
    }

    pub fn score(&self, a: Option<&Location>, b: Option<&Location>) -> Signal {
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (a, b),
            _ => return Signal::Unavailable("missing location"),
        };

        let (city_a, city_b) = (normalized(&a.city), normalized(&b.city));
        let (country_a, country_b) = (normalized(&a.country), normalized(&b.country));

        let countries_compatible = match (&country_a, &country_b) {
            (Some(x), Some(y)) => x == y,
            _ => true,
        };

        if let (Some(x), Some(y)) = (&city_a, &city_b) {
            if x == y && countries_compatible {
                return Signal::Value(SAME_CITY_SCORE);
            }
        }

        if let (Some(x), Some(y)) = (&country_a, &country_b) {
            if x == y {
                return Signal::Value(SAME_COUNTRY_SCORE);
            }
        }

        if let (Some((lat1, lon1)), Some((lat2, lon2))) = (valid_coordinates(a), valid_coordinates(b)) {
            let distance_km = haversine_distance(lat1, lon1, lat2, lon2);
            return Signal::value(distance_band_score(distance_km));
        }

        if country_a.is_some() && country_b.is_some() {
            return Signal::Value(DIFFERENT_COUNTRY_SCORE);
        }

        Signal::Unavailable("insufficient location data")
    }
}

fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Coordinates that are finite and within their geographic ranges
fn valid_coordinates(location: &Location) -> Option<(f64, f64)> {
    location.lat_lon().filter(|(lat, lon)| {
        lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(lat)
            && (-180.0..=180.0).contains(lon)
    })
}
