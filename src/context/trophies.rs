use eyre::{Context as _, Result};

use crate::{
    client::TrophyApi,
    model::{TrophyPage, TrophyRecord},
};

/// Request a player's trophy pages one after another until all of the
/// player's gains have been gathered or `page_limit` pages were requested.
pub async fn fetch_trophies<A: TrophyApi>(
    api: &A,
    player_id: &str,
    page_limit: usize,
) -> Result<Vec<TrophyRecord>> {
    let mut trophies = Vec::new();
    let mut total = None;

    for page in 0..page_limit {
        let TrophyPage {
            total: page_total,
            gains,
        } = api
            .trophy_page(player_id, page)
            .await
            .with_context(|| format!("failed to request trophy page {page}"))?;

        trophies.reserve(gains.len());

        for gain in gains {
            let trophy = TrophyRecord::from_gain(gain)
                .with_context(|| format!("failed to process gain on trophy page {page}"))?;

            trophies.push(trophy);
        }

        debug!(
            "Trophy page {page} for {player_id}: {}/{page_total} gains",
            trophies.len()
        );

        total = Some(page_total);

        if trophies.len() == page_total {
            return Ok(trophies);
        }
    }

    if let Some(total) = total {
        warn!(
            "Reached page limit of {page_limit} for {player_id} with {}/{total} gains",
            trophies.len()
        );
    }

    Ok(trophies)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::{json, Value};

    use super::*;

    struct MockApi {
        pages: Vec<TrophyPage>,
        requested: RefCell<Vec<usize>>,
    }

    impl MockApi {
        fn new(pages: Vec<TrophyPage>) -> Self {
            Self {
                pages,
                requested: RefCell::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<usize> {
            self.requested.borrow().clone()
        }
    }

    impl TrophyApi for MockApi {
        async fn trophy_page(&self, _: &str, page: usize) -> Result<TrophyPage> {
            self.requested.borrow_mut().push(page);

            let page = self
                .pages
                .get(page)
                .ok_or_else(|| eyre!("failed with status code 404 Not Found"))?;

            Ok(TrophyPage {
                total: page.total,
                gains: page.gains.clone(),
            })
        }
    }

    fn gain(second: u8, counts: [u64; 9]) -> Value {
        json!({
            "timestamp": format!("2023-05-12T17:04:{second:02}+00:00"),
            "achievement": { "trophyAchievementType": "LiveMatch" },
            "counts": counts,
        })
    }

    fn page(total: usize, gains: usize, offset: u8) -> TrophyPage {
        TrophyPage {
            total,
            gains: (0..gains as u8)
                .map(|i| gain(offset + i, [1, 0, 0, 0, 0, 0, 0, 0, 0]))
                .collect(),
        }
    }

    #[tokio::test]
    async fn single_page_matching_total() {
        let api = MockApi::new(vec![page(3, 3, 0), page(3, 3, 3)]);

        let trophies = fetch_trophies(&api, "player", 100).await.unwrap();

        assert_eq!(trophies.len(), 3);
        assert_eq!(api.requested(), [0]);
    }

    #[tokio::test]
    async fn multiple_pages() {
        let api = MockApi::new(vec![page(5, 2, 0), page(5, 2, 2), page(5, 1, 4)]);

        let trophies = fetch_trophies(&api, "player", 100).await.unwrap();

        assert_eq!(trophies.len(), 5);
        assert_eq!(api.requested(), [0, 1, 2]);

        let seconds: Vec<_> = trophies.iter().map(|t| t.timestamp.second()).collect();
        assert_eq!(seconds, [0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn stops_at_page_limit() {
        let api = MockApi::new(vec![page(10, 2, 0), page(10, 2, 2), page(10, 2, 4)]);

        let trophies = fetch_trophies(&api, "player", 2).await.unwrap();

        assert_eq!(trophies.len(), 4);
        assert_eq!(api.requested(), [0, 1]);
    }

    #[tokio::test]
    async fn empty_player() {
        let api = MockApi::new(vec![page(0, 0, 0)]);

        let trophies = fetch_trophies(&api, "player", 100).await.unwrap();

        assert!(trophies.is_empty());
        assert_eq!(api.requested(), [0]);
    }

    #[tokio::test]
    async fn failed_request_aborts() {
        let api = MockApi::new(vec![page(5, 2, 0)]);

        assert!(fetch_trophies(&api, "player", 100).await.is_err());
        assert_eq!(api.requested(), [0, 1]);
    }

    #[tokio::test]
    async fn malformed_gain_aborts() {
        let api = MockApi::new(vec![TrophyPage {
            total: 2,
            gains: vec![gain(0, [1; 9]), json!({ "counts": [1, 2] })],
        }]);

        assert!(fetch_trophies(&api, "player", 100).await.is_err());
    }
}
