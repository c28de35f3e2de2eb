//! Region shapes read from WKT files.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use geo::{Geometry, Polygon};
use thiserror::Error;
use wkt::TryFromWkt;

/// Errors raised while reading a region file.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The file could not be read.
    #[error("failed to read region file {path}")]
    Read {
        /// Location of the file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid WKT.
    #[error("invalid WKT in {path}: {message}")]
    Wkt {
        /// Location of the file.
        path: Utf8PathBuf,
        /// Parser message.
        message: String,
    },
    /// The WKT describes something without area.
    #[error("region file {path} holds a {kind}, expected a polygon")]
    NotAreal {
        /// Location of the file.
        path: Utf8PathBuf,
        /// Kind of geometry found.
        kind: &'static str,
    },
}

/// Parse one WKT polygon, multipolygon or rectangle into polygons.
///
/// # Errors
/// Returns [`RegionError::Wkt`] or [`RegionError::NotAreal`], naming
/// `origin` as the path.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use osm_merge_data::parse_region;
///
/// let polygons = parse_region(
///     "POLYGON((0 0, 0 1, 1 1, 1 0, 0 0))",
///     Utf8Path::new("campus.wkt"),
/// )?;
/// assert_eq!(polygons.len(), 1);
/// # Ok::<(), osm_merge_data::RegionError>(())
/// ```
pub fn parse_region(text: &str, origin: &Utf8Path) -> Result<Vec<Polygon<f64>>, RegionError> {
    let geometry = Geometry::<f64>::try_from_wkt_str(text.trim()).map_err(|err| RegionError::Wkt {
        path: origin.to_path_buf(),
        message: err.to_string(),
    })?;
    let not_areal = |kind| RegionError::NotAreal {
        path: origin.to_path_buf(),
        kind,
    };
    match geometry {
        Geometry::Polygon(polygon) => Ok(vec![polygon]),
        Geometry::MultiPolygon(polygons) => Ok(polygons.0),
        Geometry::Rect(rect) => Ok(vec![rect.to_polygon()]),
        Geometry::Triangle(triangle) => Ok(vec![triangle.to_polygon()]),
        Geometry::Point(_) | Geometry::MultiPoint(_) => Err(not_areal("point")),
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
            Err(not_areal("line"))
        }
        Geometry::GeometryCollection(_) => Err(not_areal("geometry collection")),
    }
}

/// Read the single WKT shape stored at `path`.
///
/// # Errors
/// Returns [`RegionError::Read`] when the file cannot be read, and the errors
/// of [`parse_region`] otherwise.
pub fn read_region(path: &Utf8Path) -> Result<Vec<Polygon<f64>>, RegionError> {
    let text = fs::read_to_string(path).map_err(|source| RegionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_region(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use rstest::rstest;

    #[rstest]
    fn multipolygons_become_separate_regions() {
        let polygons = parse_region(
            "MULTIPOLYGON(((0 0, 0 1, 1 1, 1 0, 0 0)), ((5 5, 5 7, 7 7, 7 5, 5 5)))\n",
            Utf8Path::new("campuses.wkt"),
        )
        .expect("regions");
        let areas: Vec<f64> = polygons.iter().map(Area::unsigned_area).collect();
        assert_eq!(areas, vec![1.0, 4.0]);
    }

    #[rstest]
    #[case("POINT(1 2)", "point")]
    #[case("LINESTRING(0 0, 1 1)", "line")]
    fn shapes_without_area_are_rejected(#[case] text: &str, #[case] expected: &str) {
        let err = parse_region(text, Utf8Path::new("bad.wkt")).expect_err("not areal");
        assert!(matches!(err, RegionError::NotAreal { kind, .. } if kind == expected));
    }

    #[rstest]
    fn invalid_wkt_names_the_file() {
        let err = parse_region("POLYGON((0 0", Utf8Path::new("broken.wkt")).expect_err("invalid");
        assert!(err.to_string().contains("broken.wkt"), "{err}");
    }

    #[rstest]
    fn missing_files_are_read_errors() {
        let err = read_region(Utf8Path::new("/definitely/not/here.wkt")).expect_err("missing");
        assert!(matches!(err, RegionError::Read { .. }));
    }
}
