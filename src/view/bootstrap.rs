use super::{LiveViewHandle, ViewSources, mount};
use crate::backend::{Direction, TableQuery};
use crate::config::BackendConfig;
use crate::error::SoboiteError;
use tracing::info;

/// Live views backing the home page.
///
/// The listing feeds the card grid, the map and the detail modal; the ranking feeds the
/// ranked list. Each holds its own subscription on the restaurants table.
#[derive(Clone)]
pub struct Views {
    pub listing: LiveViewHandle,
    pub ranking: LiveViewHandle,
}

impl Views {
    pub async fn mount(
        cfg: &BackendConfig,
        sources: Option<ViewSources>,
    ) -> Result<Self, SoboiteError> {
        let table = cfg.restaurants_table.as_str();

        let listing_query = TableQuery::new(table)
            .order_by("rating", Direction::Descending)
            .limit(cfg.page_limit);
        let ranking_query = TableQuery::new(table)
            .order_by("rating", Direction::Descending)
            .limit(cfg.ranking_limit);

        info!(
            table,
            page_limit = cfg.page_limit,
            ranking_limit = cfg.ranking_limit,
            backend = sources.is_some(),
            "Mounting live views"
        );

        let listing = mount("listing", listing_query, sources.clone()).await?;
        let ranking = mount("ranking", ranking_query, sources).await?;

        Ok(Self { listing, ranking })
    }

    pub async fn unmount(&self) {
        self.listing.unmount().await;
        self.ranking.unmount().await;
    }
}
