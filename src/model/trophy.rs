use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

use eyre::{Context as _, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// All trophy records, keyed by the player's display name.
pub type TrophyResults = BTreeMap<String, Vec<TrophyRecord>>;

const TIER_COUNT: usize = 9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrophyRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub achievement_type: String,
    pub count: u64,
    /// The gain payload as it was received
    pub data: Value,
}

impl TrophyRecord {
    pub fn from_gain(data: Value) -> Result<Self> {
        let gain = Gain::deserialize(&data).context("failed to deserialize trophy gain")?;

        let count = trophy_points(&gain.counts)
            .with_context(|| format!("invalid tier counts for gain at {}", gain.timestamp))?;

        Ok(Self {
            timestamp: gain.timestamp,
            achievement_type: gain.achievement.to_string(),
            count,
            data,
        })
    }
}

/// Combine tier counts into a single score where tier `i` is worth `10^i`.
///
/// The score must fit into an `i64` so that it can be raced against others.
pub fn trophy_points(counts: &[u64]) -> Result<u64> {
    ensure!(
        counts.len() == TIER_COUNT,
        "expected {TIER_COUNT} tier counts, got {}",
        counts.len()
    );

    counts
        .iter()
        .zip(0..)
        .try_fold(0_u64, |sum, (&count, tier)| {
            10_u64
                .checked_pow(tier)
                .and_then(|weight| count.checked_mul(weight))
                .and_then(|points| sum.checked_add(points))
        })
        .filter(|&points| i64::try_from(points).is_ok())
        .ok_or_else(|| eyre!("trophy points overflow for counts {counts:?}"))
}

#[derive(Deserialize)]
struct Gain {
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    achievement: Achievement,
    counts: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawAchievement")]
pub enum Achievement {
    SoloRanking { ranking: Box<str> },
    Other { kind: Box<str> },
}

impl Display for Achievement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::SoloRanking { ranking } => write!(f, "SoloRanking - {ranking}"),
            Self::Other { kind } => f.write_str(kind),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAchievement {
    trophy_achievement_type: Box<str>,
    trophy_solo_ranking_achievement_type: Option<Box<str>>,
}

impl TryFrom<RawAchievement> for Achievement {
    type Error = String;

    fn try_from(raw: RawAchievement) -> Result<Self, Self::Error> {
        let RawAchievement {
            trophy_achievement_type: kind,
            trophy_solo_ranking_achievement_type: ranking,
        } = raw;

        match (&*kind, ranking) {
            ("SoloRanking", Some(ranking)) => Ok(Self::SoloRanking { ranking }),
            ("SoloRanking", None) => Err(
                "achievement of type `SoloRanking` is missing \
                `trophySoloRankingAchievementType`"
                    .to_owned(),
            ),
            _ => Ok(Self::Other { kind }),
        }
    }
}
