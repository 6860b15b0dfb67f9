//! Series discovery - build the run's `SeriesIndex`

use crate::error::Result;
use crate::tracker::TrackerService;
use crate::types::{Patch, SeriesIndex};
use std::collections::HashSet;
use tracing::{debug, info};

/// Unique series IDs referenced by `patches`, in order of first reference
pub fn referenced_series(patches: &[Patch]) -> Vec<u64> {
    let mut seen = HashSet::new();
    patches
        .iter()
        .flat_map(|p| p.series.iter().map(|s| s.id))
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Fetch every patch in `states` and resolve each referenced series once.
///
/// The first patch referencing a series triggers its fetch; later
/// references are no-ops. Patches without a series are ignored.
pub async fn build_series_index(
    tracker: &dyn TrackerService,
    states: &[String],
) -> Result<SeriesIndex> {
    let patches = tracker.fetch_patches_by_state(states).await?;
    let mut index = SeriesIndex::new();

    if patches.is_empty() {
        info!("no patches found");
        return Ok(index);
    }

    for id in referenced_series(&patches) {
        let series = tracker.fetch_series(id).await?;
        debug!(series_id = id, patches = series.patches.len(), "found new series");
        index.insert(id, series);
    }

    info!(
        count = index.len(),
        ids = ?index.keys().collect::<Vec<_>>(),
        "built series index"
    );
    Ok(index)
}
