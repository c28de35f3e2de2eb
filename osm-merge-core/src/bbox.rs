//! Axis-aligned bounding boxes in longitude/latitude space.
//!
//! Boxes are always stored normalised (`min <= max` on both axes) with
//! `x = longitude` and `y = latitude`. Zero-width or zero-height boxes are
//! legal; [`BoundingBox::shape`] collapses them into a point or a line so
//! that intersection tests never see a zero-area polygon.

use std::fmt;

use geo::{Coord, Geometry, Line, Point, Rect};

/// Smallest axis-aligned box around a set of coordinates.
///
/// # Examples
///
/// ```
/// use osm_merge_core::BoundingBox;
///
/// let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
/// let b = BoundingBox::new(2.0, -1.0, 3.0, 0.5);
/// let merged = a.union(&b);
/// assert_eq!(merged, BoundingBox::new(0.0, -1.0, 3.0, 1.0));
/// assert!(merged.contains(&a) && merged.contains(&b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western edge (minimum longitude).
    pub min_x: f64,
    /// Southern edge (minimum latitude).
    pub min_y: f64,
    /// Eastern edge (maximum longitude).
    pub max_x: f64,
    /// Northern edge (maximum latitude).
    pub max_y: f64,
}

impl BoundingBox {
    /// Build a box from two corners given as `(x0, y0, x1, y1)`.
    ///
    /// Corners may be supplied in any order; the result is normalised.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Degenerate box covering a single coordinate.
    pub const fn from_coord(coord: Coord<f64>) -> Self {
        Self {
            min_x: coord.x,
            min_y: coord.y,
            max_x: coord.x,
            max_y: coord.y,
        }
    }

    /// South-west corner.
    pub const fn min(&self) -> Coord<f64> {
        Coord {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// North-east corner.
    pub const fn max(&self) -> Coord<f64> {
        Coord {
            x: self.max_x,
            y: self.max_y,
        }
    }

    /// Extent along the longitude axis.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along the latitude axis.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    /// Smallest box containing both `self` and `other`.
    ///
    /// The operation is commutative and associative, so folding it over a
    /// collection yields the same box regardless of order.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Fold [`BoundingBox::union`] over `boxes`; `None` for an empty input.
    pub fn union_all<I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        boxes.into_iter().reduce(|acc, next| acc.union(&next))
    }

    /// Whether `other` lies entirely inside `self` (edges inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }

    /// Whether the two boxes share at least one point (edges inclusive).
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Split the box at its midpoint into `[NW, NE, SW, SE]`.
    ///
    /// The order is fixed; callers that recurse over the quadrants rely on it
    /// for deterministic output.
    pub fn quadrants(&self) -> [Self; 4] {
        let mid = self.center();
        [
            Self::new(self.min_x, mid.y, mid.x, self.max_y),
            Self::new(mid.x, mid.y, self.max_x, self.max_y),
            Self::new(self.min_x, self.min_y, mid.x, mid.y),
            Self::new(mid.x, self.min_y, self.max_x, mid.y),
        ]
    }

    /// Geometry covering the box.
    ///
    /// A box with no width and no height becomes a [`Point`]; a box missing
    /// only one dimension becomes a [`Line`]; anything else is a polygon.
    pub fn shape(&self) -> Geometry<f64> {
        let zero_width = self.width() <= 0.0;
        let zero_height = self.height() <= 0.0;
        match (zero_width, zero_height) {
            (true, true) => Geometry::Point(Point::from(self.min())),
            (true, false) | (false, true) => Geometry::Line(Line::new(self.min(), self.max())),
            (false, false) => Geometry::Polygon(Rect::from(*self).to_polygon()),
        }
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(bbox.min(), bbox.max())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_normalises_corners() {
        let bbox = BoundingBox::new(3.0, 4.0, 1.0, 2.0);
        assert_eq!(bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(bbox.min(), Coord { x: 1.0, y: 2.0 });
    }

    #[rstest]
    #[case(vec![[1.0, 1.0, 3.0, 3.0], [2.0, 2.0, 4.0, 4.0]], [1.0, 1.0, 4.0, 4.0])]
    #[case(
        vec![[1.0, 1.0, 3.0, 3.0], [2.0, 2.0, 4.0, 4.0], [3.0, 0.0, 5.0, 2.0]],
        [1.0, 0.0, 5.0, 4.0]
    )]
    fn union_all_covers_every_box(#[case] boxes: Vec<[f64; 4]>, #[case] expected: [f64; 4]) {
        let merged = BoundingBox::union_all(
            boxes
                .into_iter()
                .map(|[x0, y0, x1, y1]| BoundingBox::new(x0, y0, x1, y1)),
        )
        .expect("non-empty input");
        let [x0, y0, x1, y1] = expected;
        assert_eq!(merged, BoundingBox::new(x0, y0, x1, y1));
    }

    #[rstest]
    fn union_all_of_nothing_is_none() {
        assert!(BoundingBox::union_all(Vec::new()).is_none());
    }

    #[rstest]
    fn quadrants_are_ordered_nw_ne_sw_se() {
        let [nw, ne, sw, se] = BoundingBox::new(0.0, 0.0, 10.0, 10.0).quadrants();
        assert_eq!(nw, BoundingBox::new(0.0, 5.0, 5.0, 10.0));
        assert_eq!(ne, BoundingBox::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(sw, BoundingBox::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(se, BoundingBox::new(5.0, 0.0, 10.0, 5.0));
    }

    #[rstest]
    fn quadrants_of_offset_box_use_midpoint() {
        let [nw, .., se] = BoundingBox::new(10.0, 20.0, 14.0, 22.0).quadrants();
        assert_eq!(nw, BoundingBox::new(10.0, 21.0, 12.0, 22.0));
        assert_eq!(se, BoundingBox::new(12.0, 20.0, 14.0, 21.0));
    }

    #[rstest]
    #[case(BoundingBox::new(1.0, 1.0, 1.0, 1.0), "point")]
    #[case(BoundingBox::new(1.0, 1.0, 1.0, 2.0), "line")]
    #[case(BoundingBox::new(1.0, 1.0, 2.0, 1.0), "line")]
    #[case(BoundingBox::new(1.0, 1.0, 2.0, 2.0), "polygon")]
    fn shape_collapses_degenerate_boxes(#[case] bbox: BoundingBox, #[case] expected: &str) {
        let kind = match bbox.shape() {
            Geometry::Point(_) => "point",
            Geometry::Line(_) => "line",
            Geometry::Polygon(_) => "polygon",
            other => panic!("unexpected shape {other:?}"),
        };
        assert_eq!(kind, expected);
    }

    #[rstest]
    fn vertical_line_spans_the_box_height() {
        let Geometry::Line(line) = BoundingBox::new(1.0, 1.0, 1.0, 3.0).shape() else {
            panic!("expected a line");
        };
        assert_eq!(line.start, Coord { x: 1.0, y: 1.0 });
        assert_eq!(line.end, Coord { x: 1.0, y: 3.0 });
    }

    #[rstest]
    fn intersects_includes_touching_edges() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(1.0, 1.0, 2.0, 2.0);
        let c = BoundingBox::new(1.5, 1.5, 2.0, 2.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[rstest]
    fn display_lists_edges_in_lon_lat_order() {
        let bbox = BoundingBox::new(-74.5, 40.4, -74.4, 40.5);
        assert_eq!(bbox.to_string(), "[-74.5, 40.4, -74.4, 40.5]");
    }
}
