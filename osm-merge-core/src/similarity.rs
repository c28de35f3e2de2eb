//! Accept/reject decisions from footprint overlap.

use std::fmt;

use geo::Area;
use thiserror::Error;

use crate::{GeometryError, SpatialEntity, jaccard};

/// Error returned for a percentage outside `0..=100`.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("similarity threshold must be between 0 and 100, got {value}")]
pub struct ThresholdError {
    /// The rejected value.
    pub value: u32,
}

/// Minimum overlap, as a whole percentage, for two footprints to match.
///
/// # Examples
/// ```
/// use osm_merge_core::Threshold;
///
/// assert_eq!(Threshold::new(95)?.ratio(), 0.95);
/// assert!(Threshold::new(101).is_err());
/// # Ok::<(), osm_merge_core::ThresholdError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(u8);

impl Threshold {
    /// Validate a percentage.
    ///
    /// # Errors
    /// Returns [`ThresholdError`] when `percent` exceeds 100.
    pub fn new(percent: u32) -> Result<Self, ThresholdError> {
        u8::try_from(percent)
            .ok()
            .filter(|value| *value <= 100)
            .map(Self)
            .ok_or(ThresholdError { value: percent })
    }

    /// The percentage.
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// The threshold as a ratio in `[0, 1]`.
    pub fn ratio(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl TryFrom<u32> for Threshold {
    type Error = ThresholdError;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Outcome of a similarity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The footprints describe the same feature.
    Accept,
    /// The footprints differ too much.
    Reject,
}

/// Jaccard score with the verdict it produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Overlap ratio in `[0, 1]`.
    pub jaccard: f64,
    /// Whether the ratio met the threshold.
    pub verdict: Verdict,
}

impl Similarity {
    /// Judge a precomputed score; the threshold is inclusive.
    pub fn judge(jaccard: f64, threshold: Threshold) -> Self {
        let verdict = if jaccard >= threshold.ratio() {
            Verdict::Accept
        } else {
            Verdict::Reject
        };
        Self { jaccard, verdict }
    }

    /// Whether the verdict is [`Verdict::Accept`].
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accept
    }
}

/// Compare the footprints of `a` and `b`.
///
/// # Errors
/// Returns [`GeometryError::DegenerateGeometry`] naming the offending entity
/// when either footprint has zero area.
pub fn classify<A, B>(a: &A, b: &B, threshold: Threshold) -> Result<Similarity, GeometryError>
where
    A: SpatialEntity + ?Sized,
    B: SpatialEntity + ?Sized,
{
    let ours = a.footprint_polygon();
    let theirs = b.footprint_polygon();
    jaccard(&ours, &theirs)
        .map(|score| Similarity::judge(score, threshold))
        .map_err(|err| {
            let culprit = if ours.unsigned_area() <= 0.0 {
                a.element()
            } else {
                b.element()
            };
            err.for_element(culprit)
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{ElementKind, ElementRef, Node, Way};
    use rstest::{fixture, rstest};

    fn way(id: i64, corners: &[(f64, f64)]) -> Way {
        let nodes = corners
            .iter()
            .zip(id * 10..)
            .map(|(&(lon, lat), node_id)| Arc::new(Node::new(node_id, lon, lat)))
            .collect();
        Way::new(id, nodes).expect("way")
    }

    #[fixture]
    fn square() -> Way {
        way(1, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    #[fixture]
    fn skewed() -> Way {
        way(2, &[(0.0, 0.0), (1.0, 0.0), (1.1, 1.0), (0.0, 1.0)])
    }

    #[rstest]
    #[case(0, true)]
    #[case(100, true)]
    #[case(101, false)]
    #[case(300, false)]
    fn threshold_range_is_validated(#[case] percent: u32, #[case] valid: bool) {
        assert_eq!(Threshold::new(percent).is_ok(), valid);
    }

    #[rstest]
    #[case(90, Verdict::Accept)]
    #[case(96, Verdict::Reject)]
    fn skewed_quadrilateral_against_threshold(
        square: Way,
        skewed: Way,
        #[case] percent: u32,
        #[case] expected: Verdict,
    ) {
        let threshold = Threshold::new(percent).expect("threshold");
        let similarity = classify(&square, &skewed, threshold).expect("similarity");
        assert!((similarity.jaccard - 1.0 / 1.05).abs() < 1e-9);
        assert_eq!(similarity.verdict, expected);
    }

    #[rstest]
    fn threshold_is_inclusive() {
        let threshold = Threshold::new(50).expect("threshold");
        assert_eq!(Similarity::judge(0.5, threshold).verdict, Verdict::Accept);
    }

    #[rstest]
    #[case(50, Verdict::Accept)]
    #[case(51, Verdict::Reject)]
    fn half_overlap_ties_at_fifty(#[case] percent: u32, #[case] expected: Verdict) {
        let block = way(4, &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let wing = way(5, &[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
        let threshold = Threshold::new(percent).expect("threshold");
        let similarity = classify(&block, &wing, threshold).expect("similarity");
        assert_eq!(similarity.jaccard, 0.5);
        assert_eq!(similarity.verdict, expected);
    }

    #[rstest]
    fn identical_footprints_accept(square: Way) {
        let threshold = Threshold::new(99).expect("threshold");
        assert!(classify(&square, &square, threshold).expect("similarity").is_accepted());
    }

    #[rstest]
    fn degenerate_footprint_names_the_entity(square: Way) {
        let line = way(3, &[(0.0, 0.0), (1.0, 1.0)]);
        let err = classify(&square, &line, Threshold::new(50).expect("threshold"))
            .expect_err("degenerate");
        assert_eq!(
            err,
            GeometryError::DegenerateGeometry {
                element: Some(ElementRef::new(ElementKind::Way, 3)),
            }
        );
    }
}
