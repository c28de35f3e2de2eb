//! Adaptive splitting of a query area.
//!
//! Data sources cap how much a single query may return. [`subdivide`] splits
//! an area into quadrants until every leaf passes a capacity probe, skipping
//! quadrants that hold nothing of interest.

use std::error::Error as StdError;

use log::debug;
use thiserror::Error;

use crate::{BoundingBox, CancellationToken};

/// Error type a capacity probe may fail with.
pub type ProbeError = Box<dyn StdError + Send + Sync>;

/// Deepest split [`subdivide`] attempts before reporting the area too dense.
pub const MAX_DEPTH: usize = 48;

/// Error returned for a minimum extent that is not a positive finite number.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
#[error("minimum extent must be a positive number of degrees, got {value}")]
pub struct MinExtentError {
    /// The rejected value.
    pub value: f64,
}

/// Tuning for [`subdivide`].
///
/// # Examples
/// ```
/// use osm_merge_core::SubdivideOptions;
///
/// assert_eq!(SubdivideOptions::new(0.01)?.min_extent(), 0.01);
/// assert!(SubdivideOptions::new(0.0).is_err());
/// assert!(SubdivideOptions::new(f64::NAN).is_err());
/// # Ok::<(), osm_merge_core::MinExtentError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubdivideOptions {
    min_extent: f64,
}

impl SubdivideOptions {
    /// Validate the smallest width or height, in degrees, a box may have and
    /// still be split further.
    ///
    /// # Errors
    /// Returns [`MinExtentError`] unless `min_extent` is finite and positive.
    pub fn new(min_extent: f64) -> Result<Self, MinExtentError> {
        if min_extent.is_finite() && min_extent > 0.0 {
            Ok(Self { min_extent })
        } else {
            Err(MinExtentError { value: min_extent })
        }
    }

    /// The minimum extent in degrees.
    pub const fn min_extent(&self) -> f64 {
        self.min_extent
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self { min_extent: 1e-4 }
    }
}

/// Errors raised by [`subdivide`].
#[derive(Debug, Error)]
pub enum SubdivisionError {
    /// A box below the minimum extent still fails the probe.
    #[error("area {bbox} is too dense to query")]
    TooSmall {
        /// The offending box.
        bbox: BoundingBox,
    },
    /// The probe itself failed.
    #[error("capacity probe failed for {bbox}: {source}")]
    Probe {
        /// The box being probed.
        bbox: BoundingBox,
        /// Underlying failure.
        #[source]
        source: ProbeError,
    },
    /// The caller cancelled the pass.
    #[error("subdivision cancelled before probing {bbox}")]
    Cancelled {
        /// The next box that would have been probed.
        bbox: BoundingBox,
    },
}

/// Split `bbox` into leaves that each satisfy `fits`.
///
/// The whole box is probed first. A box that does not fit is split into
/// quadrants in `[NW, NE, SW, SE]` order; only quadrants for which
/// `contains` holds are probed and recursed into. Leaves are returned
/// depth-first in quadrant order, so the output is deterministic.
///
/// # Errors
/// - [`SubdivisionError::TooSmall`] when a box narrower or shorter than
///   the minimum extent, or one [`MAX_DEPTH`] splits deep, still does not
///   fit.
/// - [`SubdivisionError::Probe`] when `fits` fails.
/// - [`SubdivisionError::Cancelled`] when `cancel` fires; it is checked
///   before every probe.
///
/// # Examples
/// ```
/// use osm_merge_core::{BoundingBox, CancellationToken, SubdivideOptions, subdivide};
///
/// let leaves = subdivide(
///     BoundingBox::new(0.0, 0.0, 10.0, 10.0),
///     &SubdivideOptions::default(),
///     |bbox| Ok(bbox.width() <= 6.0),
///     |_| true,
///     &CancellationToken::new(),
/// )?;
/// assert_eq!(leaves.len(), 4);
/// # Ok::<(), osm_merge_core::SubdivisionError>(())
/// ```
pub fn subdivide<F, C>(
    bbox: BoundingBox,
    options: &SubdivideOptions,
    mut fits: F,
    mut contains: C,
    cancel: &CancellationToken,
) -> Result<Vec<BoundingBox>, SubdivisionError>
where
    F: FnMut(&BoundingBox) -> Result<bool, ProbeError>,
    C: FnMut(&BoundingBox) -> bool,
{
    let mut leaves = Vec::new();
    let mut search = Search {
        options,
        fits: &mut fits,
        contains: &mut contains,
        cancel,
        leaves: &mut leaves,
    };
    search.descend(bbox, 0)?;
    Ok(leaves)
}

struct Search<'a, F, C> {
    options: &'a SubdivideOptions,
    fits: &'a mut F,
    contains: &'a mut C,
    cancel: &'a CancellationToken,
    leaves: &'a mut Vec<BoundingBox>,
}

impl<F, C> Search<'_, F, C>
where
    F: FnMut(&BoundingBox) -> Result<bool, ProbeError>,
    C: FnMut(&BoundingBox) -> bool,
{
    fn descend(&mut self, bbox: BoundingBox, depth: usize) -> Result<(), SubdivisionError> {
        if self.cancel.is_cancelled() {
            return Err(SubdivisionError::Cancelled { bbox });
        }
        if (self.fits)(&bbox).map_err(|source| SubdivisionError::Probe { bbox, source })? {
            debug!("area {bbox} fits");
            self.leaves.push(bbox);
            return Ok(());
        }
        let min_extent = self.options.min_extent();
        if depth >= MAX_DEPTH || bbox.width() < min_extent || bbox.height() < min_extent {
            return Err(SubdivisionError::TooSmall { bbox });
        }
        debug!("splitting area {bbox}");
        for quadrant in bbox.quadrants() {
            if (self.contains)(&quadrant) {
                self.descend(quadrant, depth + 1)?;
            } else {
                debug!("pruning empty area {quadrant}");
            }
        }
        Ok(())
    }
}
