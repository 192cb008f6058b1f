use serde::{Deserialize, Serialize};

/// A point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether the coordinate lies within valid GPS ranges.
    ///
    /// Nothing upstream enforces this, so check before doing geodesic math.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// `lat,lng` as expected by the maps API query parameters.
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// An ordered path, start to end. Empty means no route has been resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<Coordinate>);

impl Route {
    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Coordinate>> for Route {
    fn from(points: Vec<Coordinate>) -> Self {
        Self(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_ranges() {
        assert!(Coordinate::new(90.0, -180.0).is_valid());
        assert!(Coordinate::new(-33.86, 151.2).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 180.01).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn formats_query_value() {
        assert_eq!(Coordinate::new(3.139, 101.6869).to_query_value(), "3.139,101.6869");
    }

    #[test]
    fn route_serializes_as_plain_list() {
        let route = Route::from(vec![Coordinate::new(1.0, 2.0)]);
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json, serde_json::json!([{ "latitude": 1.0, "longitude": 2.0 }]));
    }
}
