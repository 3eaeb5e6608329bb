use servease_persistence::executor::DbExecutor;

use crate::dao::ProviderDao;
use crate::error::Error;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Active providers with known coordinates within `radius_km` of the
/// customer. Best-effort: callers fan out notifications from the result and
/// never treat an empty answer as an error.
pub async fn nearby_providers(
    db: &DbExecutor,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> Result<Vec<i64>, Error> {
    let located = db.as_dao::<ProviderDao>().active_with_location().await?;
    Ok(located
        .into_iter()
        .filter(|(_, lat, lon)| haversine_km(latitude, longitude, *lat, *lon) <= radius_km)
        .map(|(id, _, _)| id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_distance_between_cities() {
        // Connaught Place to Gurgaon city centre is roughly 25 km.
        let d = haversine_km(28.6315, 77.2167, 28.4595, 77.0266);
        assert!(d > 24.0 && d < 29.0, "got {}", d);
    }

    #[test]
    fn zero_distance_for_same_point() {
        assert!(haversine_km(12.97, 77.59, 12.97, 77.59) < 1e-9);
    }

    #[test]
    fn nearby_points_fall_inside_default_radius() {
        // ~1.1 km apart (0.01 degrees of latitude).
        let d = haversine_km(12.97, 77.59, 12.98, 77.59);
        assert!(d < DEFAULT_RADIUS_KM);
    }
}
