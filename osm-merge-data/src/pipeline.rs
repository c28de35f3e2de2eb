//! End-to-end building replacement.

use log::{info, warn};
use osm_merge_core::{
    BoundingBox, CancellationToken, EditDocument, EditError, EditFileGenerator, MatchError,
    SpatialEntity, SpatialMatcher, SubdivideOptions, SubdivisionError, Threshold, match_ways,
};
use thiserror::Error;

use crate::{CandidateSource, DocumentError, OsmDocument, fetch_candidates};

/// Errors raised by [`replace_buildings`] and [`fetch_candidates`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A document could not be read or resolved.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// Candidate queries could not be planned.
    #[error(transparent)]
    Subdivision(#[from] SubdivisionError),
    /// Matching was interrupted.
    #[error(transparent)]
    Match(#[from] MatchError),
    /// The edit could not be generated.
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Settings for [`replace_buildings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplaceOptions {
    /// Smallest Jaccard similarity, as a percentage, at which a candidate is
    /// taken to be the same building.
    pub threshold: Threshold,
    /// Query-area subdivision settings.
    pub subdivide: SubdivideOptions,
}

/// Build the edit that replaces candidate buildings with `ours`.
///
/// Candidates are fetched from `source` over the area covered by our
/// buildings, each of our buildings is paired with its nearest candidate
/// building, and relations that reference an accepted candidate are relinked
/// to the replacement.
///
/// # Errors
/// - [`PipelineError::Edit`] with [`EditError::NothingToProcess`] when `ours`
///   has no buildings with geometry.
/// - [`PipelineError::Subdivision`] when candidates cannot be fetched.
/// - [`PipelineError::Match`] when `cancel` fires during matching.
pub fn replace_buildings<S>(
    ours: &OsmDocument,
    source: &S,
    options: &ReplaceOptions,
    cancel: &CancellationToken,
) -> Result<EditDocument, PipelineError>
where
    S: CandidateSource + ?Sized,
{
    let buildings = ours.buildings();
    let interest: Vec<BoundingBox> = buildings
        .iter()
        .filter_map(|way| match way.bounds() {
            Ok(bounds) => Some(bounds),
            Err(err) => {
                warn!("way {} has no bounds: {err}", way.id);
                None
            }
        })
        .collect();
    let area = BoundingBox::union_all(interest.iter().copied()).ok_or(EditError::NothingToProcess)?;
    info!("replacing {} buildings within {area}", buildings.len());

    let candidates = fetch_candidates(source, area, &interest, &options.subdivide, cancel)?;
    let matcher = SpatialMatcher::new(candidates.buildings());
    info!("indexed {} candidate buildings", matcher.len());

    let mut pairs = match_ways(&buildings, &matcher, options.threshold, cancel)?;
    for pair in &mut pairs {
        pair.link_relations(candidates.relation_records());
    }
    let accepted = pairs
        .iter()
        .filter(|pair| pair.accepted_candidate().is_some())
        .count();
    info!("{accepted} of {} buildings matched an existing building", pairs.len());

    let generator = EditFileGenerator::new().with_context_ways(candidates.ways().iter().cloned());
    Ok(generator.generate(&pairs)?)
}
