use std::env;

use dotenvy::dotenv;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_GEOCODER_URL: &str = "https://geocode-maps.yandex.ru/1.x";

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("geocoder returned malformed position `{0}`")]
    MalformedPos(String),
}

/// Thin client for the Yandex geocoder HTTP API.
#[derive(Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Geocoder {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Self {
        dotenv().ok();

        let api_key =
            env::var("YANDEX_GEOCODER_API_KEY").expect("YANDEX_GEOCODER_API_KEY must be set");
        let base_url = env::var("YANDEX_GEOCODER_URL")
            .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string());
        Geocoder::new(base_url, api_key)
    }

    /// Resolves a free-form address to coordinates. Returns `Ok(None)` when
    /// the geocoder finds no match for the address.
    pub async fn fetch_coordinates(&self, address: &str) -> Result<Option<Point>, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("geocode", address),
                ("apikey", self.api_key.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body: GeocodeResponse = response.json().await?;

        let Some(found) = body
            .response
            .geo_object_collection
            .feature_member
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        parse_pos(&found.geo_object.point.pos).map(Some)
    }
}

/// Great-circle distance between two points in kilometers.
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

// The geocoder reports positions as "<lon> <lat>".
fn parse_pos(pos: &str) -> Result<Point, GeocodeError> {
    let mut parts = pos.split_whitespace();
    let lon = parts
        .next()
        .ok_or_else(|| GeocodeError::MalformedPos(pos.to_string()))?;
    let lat = parts
        .next()
        .ok_or_else(|| GeocodeError::MalformedPos(pos.to_string()))?;
    if parts.next().is_some() {
        return Err(GeocodeError::MalformedPos(pos.to_string()));
    }

    let lon: f64 = lon
        .parse()
        .map_err(|_| GeocodeError::MalformedPos(pos.to_string()))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| GeocodeError::MalformedPos(pos.to_string()))?;
    Ok(Point { lat, lon })
}

#[derive(Deserialize, Debug)]
struct GeocodeResponse {
    response: GeocodeBody,
}

#[derive(Deserialize, Debug)]
struct GeocodeBody {
    #[serde(rename = "GeoObjectCollection")]
    geo_object_collection: GeoObjectCollection,
}

#[derive(Deserialize, Debug)]
struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    feature_member: Vec<FeatureMember>,
}

#[derive(Deserialize, Debug)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: GeoObject,
}

#[derive(Deserialize, Debug)]
struct GeoObject {
    #[serde(rename = "Point")]
    point: GeocodePoint,
}

#[derive(Deserialize, Debug)]
struct GeocodePoint {
    pos: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOSCOW: Point = Point {
        lat: 55.7558,
        lon: 37.6173,
    };
    const SAINT_PETERSBURG: Point = Point {
        lat: 59.9311,
        lon: 30.3609,
    };

    #[test]
    fn parses_lon_lat_pair() {
        let point = parse_pos("37.617635 55.755814").unwrap();
        assert_eq!(point.lon, 37.617635);
        assert_eq!(point.lat, 55.755814);
    }

    #[test]
    fn rejects_malformed_pos() {
        assert!(matches!(
            parse_pos(""),
            Err(GeocodeError::MalformedPos(_))
        ));
        assert!(matches!(
            parse_pos("37.617635"),
            Err(GeocodeError::MalformedPos(_))
        ));
        assert!(matches!(
            parse_pos("37.617635 55.755814 12.0"),
            Err(GeocodeError::MalformedPos(_))
        ));
        assert!(matches!(
            parse_pos("east north"),
            Err(GeocodeError::MalformedPos(_))
        ));
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_distance(MOSCOW, MOSCOW), 0.0);
    }

    #[test]
    fn distance_matches_known_route() {
        let d = haversine_distance(MOSCOW, SAINT_PETERSBURG);
        assert!((630.0..635.0).contains(&d), "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_distance(MOSCOW, SAINT_PETERSBURG);
        let back = haversine_distance(SAINT_PETERSBURG, MOSCOW);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn quarter_equator_distance() {
        let origin = Point { lat: 0.0, lon: 0.0 };
        let quarter = Point { lat: 0.0, lon: 90.0 };
        let d = haversine_distance(origin, quarter);
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 0.1, "got {d}");
    }

    #[test]
    fn deserializes_geocoder_response() {
        let raw = r#"{
            "response": {
                "GeoObjectCollection": {
                    "metaDataProperty": {"GeocoderResponseMetaData": {"found": "1"}},
                    "featureMember": [
                        {
                            "GeoObject": {
                                "name": "Red Square",
                                "Point": {"pos": "37.620393 55.75396"}
                            }
                        }
                    ]
                }
            }
        }"#;
        let parsed: GeocodeResponse = serde_json::from_str(raw).unwrap();
        let members = parsed.response.geo_object_collection.feature_member;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].geo_object.point.pos, "37.620393 55.75396");
    }

    #[test]
    fn deserializes_empty_result() {
        let raw = r#"{
            "response": {
                "GeoObjectCollection": {
                    "featureMember": []
                }
            }
        }"#;
        let parsed: GeocodeResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed
            .response
            .geo_object_collection
            .feature_member
            .is_empty());
    }
}
