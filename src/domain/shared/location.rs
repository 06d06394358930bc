use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Zero coordinates mean "unknown" in store payloads
    fn is_known(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0 && self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Great-circle distance in kilometres. Unknown points are infinitely far.
pub fn distance_km(from: Option<&GeoPoint>, to: Option<&GeoPoint>) -> f64 {
    let (from, to) = match (from, to) {
        (Some(a), Some(b)) if a.is_known() && b.is_known() => (a, b),
        _ => return f64::INFINITY,
    };

    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn format_distance(km: f64) -> String {
    if !km.is_finite() || km == 0.0 {
        return String::new();
    }

    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else if km < 10.0 {
        format!("{:.1}km", km)
    } else {
        format!("{}km", km.round() as i64)
    }
}
