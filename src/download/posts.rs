//! Post aggregation: count, then fan out page fetches.

use futures::stream::{self, StreamExt};

use crate::api::{OnlyFansApi, Post, PAGE_SIZE};
use crate::error::{Error, Result};

/// Largest post count accepted from the count query.
pub const MAX_POST_COUNT: u64 = 1_000_000;

/// Offsets of every page needed to cover `total` posts.
pub fn page_offsets(total: u64, page_size: u64) -> impl Iterator<Item = u64> {
    let pages = if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    };
    (0..pages).map(move |page| page * page_size)
}

/// Fetch every post of a user, at most `concurrency` pages in flight.
///
/// Pages come back in completion order; the result is not sorted.
pub async fn all_posts(api: &OnlyFansApi, user_id: u64, concurrency: usize) -> Result<Vec<Post>> {
    let total = api.count_posts(user_id).await?;
    if total > MAX_POST_COUNT {
        return Err(Error::Api(format!(
            "User {} reports {} posts, more than the supported {}",
            user_id, total, MAX_POST_COUNT
        )));
    }

    tracing::info!(
        "User {}: {} posts across {} page(s)",
        user_id,
        total,
        total.div_ceil(PAGE_SIZE)
    );

    let pages: Vec<Result<Vec<Post>>> = stream::iter(page_offsets(total, PAGE_SIZE))
        .map(|offset| api.fetch_posts_page(user_id, offset))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut posts = Vec::new();
    for page in pages {
        posts.extend(page?);
    }

    tracing::debug!("User {}: aggregated {} posts", user_id, posts.len());
    Ok(posts)
}
