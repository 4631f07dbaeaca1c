use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::riot_api::MatchApi;

/// Largest `count` the match listing endpoint accepts.
pub const MATCH_PAGE_SIZE: usize = 100;

pub fn collect_match_ids<A: MatchApi + ?Sized>(
    api: &A,
    puuid: &str,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    collect_match_ids_paged(api, puuid, MATCH_PAGE_SIZE, limit)
}

/// Pages through a player's match history until a page comes back shorter
/// than `page_size`. A history that is an exact multiple of the page size
/// costs one extra, empty request. Any failure aborts the whole collection.
pub fn collect_match_ids_paged<A: MatchApi + ?Sized>(
    api: &A,
    puuid: &str,
    page_size: usize,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    let page_size = page_size.clamp(1, MATCH_PAGE_SIZE);
    let mut all = Vec::new();
    let mut start = 0usize;

    loop {
        let page = api
            .match_ids_page(puuid, start, page_size)
            .with_context(|| format!("failed to list match ids (start={start}, count={page_size})"))?;
        debug!(start, returned = page.len(), "match id page");
        if page.is_empty() {
            break;
        }
        let last_page = page.len() < page_size;
        all.extend(page);

        if let Some(limit) = limit
            && all.len() >= limit
        {
            all.truncate(limit);
            break;
        }
        if last_page {
            break;
        }
        start += page_size;
    }

    info!(total = all.len(), "collected match ids");
    Ok(all)
}
