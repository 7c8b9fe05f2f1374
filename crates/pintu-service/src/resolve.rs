//! Turning [`ImageSource`]s into encoded buffers.
//!
//! Id sources are looked up in one batch query whose result order is not
//! trusted; every source is then fetched concurrently and the buffers are
//! returned in request order.

use std::collections::HashMap;

use futures::future::try_join_all;
use pintu_core::{plan_layout, probe, CompositeLayout, Direction, StitchSettings};

use crate::error::ServiceError;
use crate::source::{ImageSource, SourceRef};
use crate::traits::{MetadataStore, ObjectStore, RemoteFetcher};

enum Location<'a> {
    Stored(&'a str),
    Remote(&'a str),
}

/// Fetch every source, preserving order. Any failure fails the whole batch.
pub async fn resolve_sources<O, M, F>(
    sources: &[ImageSource],
    objects: &O,
    metadata: &M,
    fetcher: &F,
) -> Result<Vec<Vec<u8>>, ServiceError>
where
    O: ObjectStore,
    M: MetadataStore,
    F: RemoteFetcher,
{
    let ids: Vec<String> = sources
        .iter()
        .filter_map(|source| match &source.reference {
            SourceRef::Id(id) => Some(id.clone()),
            _ => None,
        })
        .collect();

    let paths_by_id: HashMap<String, String> = if ids.is_empty() {
        HashMap::new()
    } else {
        metadata
            .images_by_ids(&ids)
            .await?
            .into_iter()
            .map(|record| (record.id, record.storage_path))
            .collect()
    };

    let locations = sources
        .iter()
        .enumerate()
        .map(|(index, source)| match &source.reference {
            SourceRef::Id(id) => paths_by_id
                .get(id)
                .map(|path| Location::Stored(path.as_str()))
                .ok_or_else(|| ServiceError::Fetch {
                    index,
                    reference: source.reference.clone(),
                    reason: "image not found".to_string(),
                }),
            SourceRef::Path(path) => Ok(Location::Stored(path.as_str())),
            SourceRef::Url(url) => Ok(Location::Remote(url.as_str())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fetches = locations
        .into_iter()
        .zip(sources)
        .enumerate()
        .map(|(index, (location, source))| async move {
            let result = match location {
                Location::Stored(path) => objects.get(path).await.map_err(|e| e.to_string()),
                Location::Remote(url) => fetcher.fetch(url).await.map_err(|e| e.to_string()),
            };
            result.map_err(|reason| ServiceError::Fetch {
                index,
                reference: source.reference.clone(),
                reason,
            })
        });

    let buffers = try_join_all(fetches).await?;
    log::debug!("Resolved {} sources", buffers.len());
    Ok(buffers)
}

/// Probe fetched buffers and enforce the summed pixel bound.
///
/// Unreadable headers are skipped here; the stitcher reports them with their
/// index. Hints that disagree with the probed size are logged and ignored.
pub fn check_pixel_budget<S: AsRef<[u8]>>(
    buffers: &[S],
    sources: &[ImageSource],
    max_total_pixels: u64,
) -> Result<u64, ServiceError> {
    let mut total: u64 = 0;
    for (index, bytes) in buffers.iter().enumerate() {
        let Ok(meta) = probe(bytes.as_ref()) else {
            continue;
        };
        if let Some(hint) = sources.get(index).and_then(ImageSource::hints) {
            if hint != (meta.width, meta.height) {
                log::debug!(
                    "Image #{index} recorded as {}x{} but is {}x{}",
                    hint.0,
                    hint.1,
                    meta.width,
                    meta.height
                );
            }
        }
        total = total.saturating_add(meta.pixel_count());
    }

    if total > max_total_pixels {
        return Err(ServiceError::Validation(format!(
            "Source images total {total} pixels (max {max_total_pixels})"
        )));
    }
    Ok(total)
}

/// Plan the canvas and enforce the pixel bound on its area.
///
/// Small sources can still produce a huge canvas once they are scaled onto
/// the first image's cross-axis, so this runs before any pixels are decoded.
pub fn check_canvas_budget<S: AsRef<[u8]>>(
    buffers: &[S],
    direction: Direction,
    settings: &StitchSettings,
    max_total_pixels: u64,
) -> Result<CompositeLayout, ServiceError> {
    let layout = plan_layout(buffers, direction, settings)?;
    let area = layout.pixel_count();
    if area > max_total_pixels {
        return Err(ServiceError::Validation(format!(
            "Stitched canvas {}x{} is {area} pixels (max {max_total_pixels})",
            layout.width, layout.height
        )));
    }
    Ok(layout)
}
