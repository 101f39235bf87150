use std::{fs, path::Path};

use eyre::{Context as _, Result};
use time::OffsetDateTime;

use crate::{
    config::PlotSettings,
    model::{TrophyRecord, TrophyResults},
};

mod render;
mod report;
mod series;

pub struct CumulativeChart {
    pub series: Vec<(String, Vec<(OffsetDateTime, u64)>)>,
}

pub struct RaceChart {
    pub players: [String; 2],
    /// Points of the first player minus points of the second
    pub deltas: Vec<(OffsetDateTime, i64)>,
}

pub struct CategorizedChart {
    pub start: OffsetDateTime,
    pub categories: Vec<String>,
    /// Per player, the points for each category
    pub bars: Vec<(String, Vec<u64>)>,
}

pub struct Charts {
    pub cumulative: CumulativeChart,
    pub race: RaceChart,
    pub categorized: CategorizedChart,
}

impl Charts {
    pub const CUMULATIVE: &'static str = "cumulative";
    pub const RACE: &'static str = "john_v_marc";
    pub const CATEGORIZED: &'static str = "categorized";

    pub fn new(trophies: TrophyResults, settings: &PlotSettings) -> Result<Self> {
        let categories = series::categories(&trophies);

        let chronological: TrophyResults = trophies
            .into_iter()
            .map(|(player, mut trophies)| {
                trophies.sort_by_key(|trophy| trophy.timestamp);

                (player, trophies)
            })
            .collect();

        let cumulative = CumulativeChart {
            series: chronological
                .iter()
                .map(|(player, trophies)| {
                    series::cumulative(trophies)
                        .map(|points| (player.clone(), points))
                        .with_context(|| format!("failed to accumulate points of `{player}`"))
                })
                .collect::<Result<_>>()?,
        };

        let [left, right] = &settings.race_players;

        let race = RaceChart {
            deltas: series::race(
                player_trophies(&chronological, left)?,
                player_trophies(&chronological, right)?,
            )
            .with_context(|| format!("failed to race `{left}` against `{right}`"))?,
            players: settings.race_players.clone(),
        };

        let bars: Vec<_> = chronological
            .iter()
            .map(|(player, trophies)| {
                series::categorized(&categories, trophies, settings.start_date)
                    .map(|totals| (player.clone(), totals))
                    .with_context(|| format!("failed to categorize points of `{player}`"))
            })
            .collect::<Result<_>>()?;

        let categorized = CategorizedChart {
            start: settings.start_date,
            categories,
            bars,
        };

        Ok(Self {
            cumulative,
            race,
            categorized,
        })
    }

    /// Render all charts and write them as HTML reports into `dir`.
    pub fn write_all(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory `{}`", dir.display()))?;

        let [left, right] = &self.race.players;

        let reports = [
            (
                Self::CUMULATIVE,
                "Cumulative trophy points".to_owned(),
                render::cumulative(&self.cumulative),
            ),
            (
                Self::RACE,
                format!("{left} vs {right}"),
                render::race(&self.race),
            ),
            (
                Self::CATEGORIZED,
                "Categorized trophy points".to_owned(),
                render::categorized(&self.categorized),
            ),
        ];

        for (name, title, svg) in reports {
            let svg = svg.with_context(|| format!("failed to render chart `{name}`"))?;
            let path = dir.join(format!("{name}.html"));

            report::write(&path, &title, &svg)?;
            info!("Wrote {}", path.display());
        }

        Ok(())
    }
}

fn player_trophies<'t>(trophies: &'t TrophyResults, player: &str) -> Result<&'t [TrophyRecord]> {
    trophies
        .get(player)
        .map(Vec::as_slice)
        .ok_or_else(|| eyre!("player `{player}` is missing from the trophy results"))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use time::{macros::datetime, Duration};

    use super::*;

    fn trophy(day: i64, kind: &str, count: u64) -> TrophyRecord {
        TrophyRecord {
            timestamp: datetime!(2023-01-01 0:00 UTC) + Duration::days(day),
            achievement_type: kind.to_owned(),
            count,
            data: Value::Null,
        }
    }

    fn settings() -> PlotSettings {
        PlotSettings {
            start_date: datetime!(2023-01-05 0:00 UTC),
            race_players: ["jmal".to_owned(), "sampleses".to_owned()],
        }
    }

    fn trophies() -> TrophyResults {
        let mut trophies = TrophyResults::new();

        // unsorted on purpose
        trophies.insert(
            "jmal".to_owned(),
            vec![
                trophy(6, "SoloRanking - SeasonalCampaign", 30),
                trophy(0, "LiveMatch", 5),
                trophy(4, "LiveMatch", 10),
            ],
        );
        trophies.insert(
            "sampleses".to_owned(),
            vec![trophy(5, "CompetitionRanking", 20), trophy(1, "LiveMatch", 3)],
        );

        trophies
    }

    #[test]
    fn builds_all_series() {
        let charts = Charts::new(trophies(), &settings()).unwrap();

        let cumulative: Vec<_> = charts.cumulative.series[0]
            .1
            .iter()
            .map(|&(_, total)| total)
            .collect();

        assert_eq!(charts.cumulative.series[0].0, "jmal");
        assert_eq!(cumulative, [5, 15, 45]);

        let deltas: Vec<_> = charts.race.deltas.iter().map(|&(_, delta)| delta).collect();
        assert_eq!(deltas, [5, 2, 12, -8, 22]);

        assert_eq!(
            charts.categorized.categories,
            ["CompetitionRanking", "LiveMatch", "SoloRanking - SeasonalCampaign"]
        );
        assert_eq!(charts.categorized.bars[0], ("jmal".to_owned(), vec![0, 10, 30]));
        assert_eq!(
            charts.categorized.bars[1],
            ("sampleses".to_owned(), vec![20, 0, 0])
        );
    }

    #[test]
    fn missing_race_player() {
        let mut trophies = trophies();
        trophies.remove("sampleses");

        let err = Charts::new(trophies, &settings()).err().unwrap();

        assert!(err.to_string().contains("sampleses"));
    }

    #[test]
    fn writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let charts = Charts::new(trophies(), &settings()).unwrap();

        charts.write_all(&out).unwrap();

        for name in [Charts::CUMULATIVE, Charts::RACE, Charts::CATEGORIZED] {
            let html = fs::read_to_string(out.join(format!("{name}.html"))).unwrap();

            assert!(html.starts_with("<!DOCTYPE html>"));
            assert!(html.contains("<svg"));
        }

        let categorized = fs::read_to_string(out.join("categorized.html")).unwrap();
        assert!(categorized.contains("CompetitionRanking"));
    }

    #[test]
    fn empty_players_still_render() {
        let mut trophies = TrophyResults::new();
        trophies.insert("jmal".to_owned(), Vec::new());
        trophies.insert("sampleses".to_owned(), Vec::new());

        let charts = Charts::new(trophies, &settings()).unwrap();

        assert!(charts.race.deltas.is_empty());
        assert!(charts.categorized.categories.is_empty());

        let dir = tempfile::tempdir().unwrap();
        charts.write_all(dir.path()).unwrap();
    }
}
