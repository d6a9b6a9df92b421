//! Geographic points and the lenient coordinate parsing applied before
//! aggregation.
//!
//! Upstream rows carry coordinates either as JSON numbers or as numeric
//! strings, and some rows carry none at all. [`RawPoint`] keeps that shape;
//! [`Locate::locate`] turns it into a validated [`GeoPoint`] or nothing.

use geo::Coord;

/// A validated location in decimal degrees.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`, matching
/// `geo`'s axis order. Both components are always finite.
///
/// # Examples
/// ```
/// use taxi_core::GeoPoint;
///
/// let point = GeoPoint::new(40.758, -73.985).expect("finite coordinates");
/// assert_eq!(point.lat(), 40.758);
/// assert_eq!(point.lng(), -73.985);
/// assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    coord: Coord<f64>,
}

impl GeoPoint {
    /// Build a point, returning `None` when either coordinate is not finite.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Option<Self> {
        if lat.is_finite() && lng.is_finite() {
            Some(Self {
                coord: Coord { x: lng, y: lat },
            })
        } else {
            None
        }
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.coord.y
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.coord.x
    }

    /// The point as a `geo` coordinate.
    #[must_use]
    pub const fn coord(&self) -> Coord<f64> {
        self.coord
    }
}

/// A single coordinate as it arrives from a row: a number or a numeric string.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Coordinate {
    /// A value already decoded as a number.
    Number(f64),
    /// A textual value such as `"40.758"`.
    Text(String),
}

impl Coordinate {
    /// Parse the coordinate, returning `None` unless it is a finite number.
    ///
    /// Surrounding whitespace in textual values is ignored.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        };
        parsed.filter(|value| value.is_finite())
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A point whose coordinates have not been validated yet.
///
/// # Examples
/// ```
/// use taxi_core::{Locate, RawPoint};
///
/// let raw = RawPoint::new("40.758", -73.985);
/// let point = raw.locate().expect("both coordinates parse");
/// assert_eq!(point.lat(), 40.758);
///
/// assert!(RawPoint::default().locate().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawPoint {
    /// Latitude, if the row carried one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lat: Option<Coordinate>,
    /// Longitude, if the row carried one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lng: Option<Coordinate>,
}

impl RawPoint {
    /// Build a raw point from two present coordinates.
    pub fn new(lat: impl Into<Coordinate>, lng: impl Into<Coordinate>) -> Self {
        Self {
            lat: Some(lat.into()),
            lng: Some(lng.into()),
        }
    }
}

/// Resolve a value to a validated [`GeoPoint`].
///
/// Returning `None` means the value is dropped by consumers such as
/// [`aggregate`](crate::aggregate).
pub trait Locate {
    /// Return the point, or `None` when it cannot be located.
    fn locate(&self) -> Option<GeoPoint>;
}

impl Locate for GeoPoint {
    fn locate(&self) -> Option<GeoPoint> {
        Some(*self)
    }
}

impl Locate for RawPoint {
    fn locate(&self) -> Option<GeoPoint> {
        let lat = self.lat.as_ref()?.value()?;
        let lng = self.lng.as_ref()?.value()?;
        GeoPoint::new(lat, lng)
    }
}

impl<T: Locate> Locate for Option<T> {
    fn locate(&self) -> Option<GeoPoint> {
        self.as_ref().and_then(Locate::locate)
    }
}

impl<T: Locate + ?Sized> Locate for &T {
    fn locate(&self) -> Option<GeoPoint> {
        (**self).locate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Coordinate::Number(40.5), Some(40.5))]
    #[case(Coordinate::from("40.5"), Some(40.5))]
    #[case(Coordinate::from("  -73.9 "), Some(-73.9))]
    #[case(Coordinate::from(""), None)]
    #[case(Coordinate::from("north"), None)]
    #[case(Coordinate::from("NaN"), None)]
    #[case(Coordinate::from("inf"), None)]
    #[case(Coordinate::Number(f64::INFINITY), None)]
    fn coordinate_parses_numbers_and_numeric_strings(
        #[case] coordinate: Coordinate,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(coordinate.value(), expected);
    }

    #[rstest]
    #[case(RawPoint { lat: None, lng: Some(Coordinate::Number(1.0)) })]
    #[case(RawPoint { lat: Some(Coordinate::Number(1.0)), lng: None })]
    #[case(RawPoint::new("1.0", "east"))]
    fn raw_point_without_two_coordinates_is_not_located(#[case] raw: RawPoint) {
        assert!(raw.locate().is_none());
    }

    #[rstest]
    fn geo_point_uses_lng_as_x() {
        let point = GeoPoint::new(1.0, 2.0).expect("finite point");
        assert_eq!(point.coord(), Coord { x: 2.0, y: 1.0 });
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn raw_point_decodes_mixed_json() {
        let raw: RawPoint =
            serde_json::from_str(r#"{"lat":"40.75","lng":-73.99}"#).expect("decode raw point");
        let point = raw.locate().expect("locate decoded point");
        assert_eq!(point.lat(), 40.75);
        assert_eq!(point.lng(), -73.99);
    }
}
