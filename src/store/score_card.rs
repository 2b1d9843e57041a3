use crate::api::AdminApi;
use crate::cache::CacheLayer;
use crate::domain::{ResourceKey, ScoreCardQuery, ScoreCardReport};
use crate::http::ApiError;
use crate::resource::Operation;

use super::entity::StoreOptions;

/// Wiring for the score-card report, cached per company and date range.
pub struct ScoreCardStore {
  report: Operation<ScoreCardQuery, ScoreCardReport>,
}

impl ScoreCardStore {
  pub fn new(api: AdminApi, cache: CacheLayer, options: StoreOptions) -> Self {
    let ttl = options.ttl;

    let report = Operation::read(
      "score card report",
      "Failed to fetch score card report",
      move |query: ScoreCardQuery| {
        let api = api.clone();
        let cache = cache.clone();
        async move {
          let key = ResourceKey::ScoreCard(query.clone()).cache_key();
          let result = cache.fetch(&key, ttl, || api.score_card(&query)).await?;
          Ok::<_, ApiError>(result.data)
        }
      },
    )
    .with_sequencing(options.sequencing);

    Self { report }
  }

  pub fn report(&self) -> &Operation<ScoreCardQuery, ScoreCardReport> {
    &self.report
  }
}
