use std::fmt;

use crate::error::ParseError;
use crate::geometry::wkt::parse_polygon;
use crate::geometry::Polygon;
use crate::records::ZoneRecord;

/// Hierarchy level of a reference zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneLevel {
    /// Top level, e.g. a store division.
    Division,
    /// Mid level.
    Department,
    /// Leaf level.
    Aisle,
    /// Any type outside the known hierarchy, kept verbatim.
    Other(String),
}

impl ZoneLevel {
    /// Maps a collaborator type name to a level, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "division" => Self::Division,
            "department" => Self::Department,
            "aisle" => Self::Aisle,
            _ => Self::Other(name.to_owned()),
        }
    }
}

impl fmt::Display for ZoneLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Division => f.write_str("Division"),
            Self::Department => f.write_str("Department"),
            Self::Aisle => f.write_str("Aisle"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// A read-only reference region used to tag nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub level: ZoneLevel,
    pub polygon: Polygon,
}

impl Zone {
    #[must_use]
    pub fn new(id: impl Into<String>, level: ZoneLevel, polygon: Polygon) -> Self {
        Self {
            id: id.into(),
            level,
            polygon,
        }
    }

    /// Builds a zone from its exchange record, unscaling the boundary.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the boundary text is malformed.
    pub fn from_record(record: &ZoneRecord, scale: f64) -> Result<Self, ParseError> {
        Ok(Self {
            id: record.zone_id.clone(),
            level: ZoneLevel::parse(&record.zone_type),
            polygon: parse_polygon(&record.wkt, scale)?,
        })
    }
}

/// Zones of one level, in input order.
pub fn zones_of_level<'a>(zones: &'a [Zone], level: &'a ZoneLevel) -> impl Iterator<Item = &'a Zone> {
    zones.iter().filter(move |z| &z.level == level)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(ZoneLevel::parse("Division"), ZoneLevel::Division);
        assert_eq!(ZoneLevel::parse("department"), ZoneLevel::Department);
        assert_eq!(ZoneLevel::parse(" AISLE "), ZoneLevel::Aisle);
        assert_eq!(ZoneLevel::parse("Checkout"), ZoneLevel::Other("Checkout".into()));
        assert_eq!(ZoneLevel::Other("Checkout".into()).to_string(), "Checkout");
    }

    #[test]
    fn zone_from_record_unscales_boundary() {
        let record: ZoneRecord = serde_json::from_str(
            r#"{"zoneId": 17, "wkt": "POLYGON((0 0, 4000 0, 4000 2000, 0 2000, 0 0))", "type": "Aisle"}"#,
        )
        .unwrap();
        let zone = Zone::from_record(&record, 1000.0).unwrap();
        assert_eq!(zone.id, "17");
        assert_eq!(zone.level, ZoneLevel::Aisle);
        assert!((zone.polygon.area() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn filter_by_level() {
        let square = Polygon::rectangle(0.0, 0.0, 1.0, 1.0);
        let zones = vec![
            Zone::new("d1", ZoneLevel::Division, square.clone()),
            Zone::new("a1", ZoneLevel::Aisle, square.clone()),
            Zone::new("a2", ZoneLevel::Aisle, square),
        ];
        let aisles: Vec<&str> = zones_of_level(&zones, &ZoneLevel::Aisle)
            .map(|z| z.id.as_str())
            .collect();
        assert_eq!(aisles, vec!["a1", "a2"]);
    }
}
