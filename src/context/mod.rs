use std::time::Instant;

use eyre::{Context as _, Result};

use crate::{
    cache::Cache,
    client::{Client, TrophyApi},
    config::Config,
    model::TrophyResults,
    plot::Charts,
};

pub use self::trophies::fetch_trophies;

mod trophies;

pub struct Context {
    client: Client,
    cache: Cache,
}

impl Context {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(&config.api),
            cache: Cache::new(&config.cache_path),
        }
    }

    pub async fn run(&self, config: &Config) -> Result<()> {
        let start = Instant::now();

        let trophies = self.gather_trophies(config).await?;

        info!("Plotting");

        let charts = Charts::new(trophies, &config.plot).context("failed to prepare charts")?;

        charts
            .write_all(&config.output_dir)
            .context("failed to write charts")?;

        info!("Finished in {:.2}s", start.elapsed().as_secs_f32());

        Ok(())
    }

    /// Load trophies from the cache or, if there is none, request them
    /// and fill the cache.
    async fn gather_trophies(&self, config: &Config) -> Result<TrophyResults> {
        let path = self.cache.path().display();

        if let Some(trophies) = self.cache.load().context("failed to load cache")? {
            info!("Loaded trophies of {} player(s) from `{path}`", trophies.len());

            return Ok(trophies);
        }

        let trophies = Self::request_trophies(&self.client, config).await?;

        self.cache
            .store(&trophies)
            .context("failed to store cache")?;

        info!("Cached trophies of {} player(s) in `{path}`", trophies.len());

        Ok(trophies)
    }

    async fn request_trophies<A: TrophyApi>(api: &A, config: &Config) -> Result<TrophyResults> {
        let mut results = TrophyResults::new();

        for (name, player_id) in config.players.iter() {
            info!("Fetching trophy results for {name}");

            let trophies = fetch_trophies(api, player_id, config.api.page_limit)
                .await
                .with_context(|| format!("failed to fetch trophies of {name} ({player_id})"))?;

            info!("Received {} trophy gains for {name}", trophies.len());
            results.insert(name.clone(), trophies);
        }

        Ok(results)
    }
}
