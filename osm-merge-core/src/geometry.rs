//! Polygon overlap measures.

use geo::{Area, BooleanOps, MultiPolygon};
use thiserror::Error;

use crate::ElementRef;

/// Errors raised when an entity has no usable geometry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    /// The entity has no children and no cached shape.
    #[error("{element} has no geometry")]
    EmptyGeometry {
        /// The offending element.
        element: ElementRef,
    },
    /// A footprint has zero area, so an overlap ratio is undefined.
    #[error("zero-area footprint{}", describe(.element.as_ref()))]
    DegenerateGeometry {
        /// The offending element, when known.
        element: Option<ElementRef>,
    },
}

fn describe(element: Option<&ElementRef>) -> String {
    element.map_or_else(String::new, |element| format!(" on {element}"))
}

impl GeometryError {
    /// Attach `element` to a [`GeometryError::DegenerateGeometry`] that does
    /// not name one yet.
    #[must_use]
    pub fn for_element(self, element: ElementRef) -> Self {
        match self {
            Self::DegenerateGeometry { element: None } => Self::DegenerateGeometry {
                element: Some(element),
            },
            other => other,
        }
    }
}

/// Jaccard index of two footprints: `area(a ∩ b) / area(a ∪ b)`.
///
/// The result lies in `[0, 1]`; identical footprints score `1` and disjoint
/// ones `0`.
///
/// # Errors
/// Returns [`GeometryError::DegenerateGeometry`] when either footprint has
/// zero area.
///
/// # Examples
/// ```
/// use geo::{Coord, MultiPolygon, Rect};
/// use osm_merge_core::jaccard;
///
/// let square = |x: f64| {
///     MultiPolygon::new(vec![
///         Rect::new(Coord { x, y: 0.0 }, Coord { x: x + 2.0, y: 2.0 }).to_polygon(),
///     ])
/// };
/// let score = jaccard(&square(0.0), &square(1.0))?;
/// assert!((score - 1.0 / 3.0).abs() < 1e-9);
/// # Ok::<(), osm_merge_core::GeometryError>(())
/// ```
pub fn jaccard(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<f64, GeometryError> {
    if a.unsigned_area() <= 0.0 || b.unsigned_area() <= 0.0 {
        return Err(GeometryError::DegenerateGeometry { element: None });
    }
    let union = a.union(b).unsigned_area();
    if union <= 0.0 {
        return Err(GeometryError::DegenerateGeometry { element: None });
    }
    let intersection = a.intersection(b).unsigned_area();
    Ok((intersection / union).clamp(0.0, 1.0))
}
