use std::{
    collections::{BTreeSet, HashMap},
    iter::Peekable,
    slice::Iter,
};

use eyre::Result;
use time::OffsetDateTime;

use crate::model::{TrophyRecord, TrophyResults};

/// Sorted union of all achievement types across all players.
pub fn categories(trophies: &TrophyResults) -> Vec<String> {
    trophies
        .values()
        .flatten()
        .map(|trophy| trophy.achievement_type.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Running total of trophy points.
///
/// Trophies must be sorted by timestamp.
pub fn cumulative(trophies: &[TrophyRecord]) -> Result<Vec<(OffsetDateTime, u64)>> {
    let mut sum = 0_u64;

    trophies
        .iter()
        .map(|trophy| {
            sum = sum
                .checked_add(trophy.count)
                .ok_or_else(|| eyre!("cumulative trophy points overflow at {}", trophy.timestamp))?;

            Ok((trophy.timestamp, sum))
        })
        .collect()
}

/// Difference between the running totals of `left` and `right`,
/// sampled at every trophy of either of them.
///
/// Both lists must be sorted by timestamp.
pub fn race(
    left: &[TrophyRecord],
    right: &[TrophyRecord],
) -> Result<Vec<(OffsetDateTime, i64)>> {
    let mut left_sum = 0_i64;
    let mut right_sum = 0_i64;

    MergeByTime::new(left, right)
        .map(|(side, trophy)| {
            let sum = match side {
                Side::Left => &mut left_sum,
                Side::Right => &mut right_sum,
            };

            *sum = i64::try_from(trophy.count)
                .ok()
                .and_then(|count| sum.checked_add(count))
                .ok_or_else(|| eyre!("race trophy points overflow at {}", trophy.timestamp))?;

            let delta = left_sum
                .checked_sub(right_sum)
                .ok_or_else(|| eyre!("race delta overflow at {}", trophy.timestamp))?;

            Ok((trophy.timestamp, delta))
        })
        .collect()
}

/// Points per category of all trophies earned at or after `start`.
///
/// The result is aligned with `categories`; categories without
/// trophies are zero.
pub fn categorized(
    categories: &[String],
    trophies: &[TrophyRecord],
    start: OffsetDateTime,
) -> Result<Vec<u64>> {
    let mut totals = HashMap::<&str, u64>::new();

    for trophy in trophies.iter().filter(|trophy| trophy.timestamp >= start) {
        let total = totals.entry(trophy.achievement_type.as_str()).or_default();

        *total = total.checked_add(trophy.count).ok_or_else(|| {
            eyre!("trophy points of `{}` overflow", trophy.achievement_type)
        })?;
    }

    let bars = categories
        .iter()
        .map(|category| totals.get(category.as_str()).copied().unwrap_or(0))
        .collect();

    Ok(bars)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Merges two sorted lists by timestamp. On equal timestamps
/// the left trophy comes first.
struct MergeByTime<'t> {
    left: Peekable<Iter<'t, TrophyRecord>>,
    right: Peekable<Iter<'t, TrophyRecord>>,
}

impl<'t> MergeByTime<'t> {
    fn new(left: &'t [TrophyRecord], right: &'t [TrophyRecord]) -> Self {
        Self {
            left: left.iter().peekable(),
            right: right.iter().peekable(),
        }
    }
}

impl<'t> Iterator for MergeByTime<'t> {
    type Item = (Side, &'t TrophyRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let take_left = match (self.left.peek(), self.right.peek()) {
            (Some(left), Some(right)) => left.timestamp <= right.timestamp,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };

        if take_left {
            self.left.next().map(|trophy| (Side::Left, trophy))
        } else {
            self.right.next().map(|trophy| (Side::Right, trophy))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.left.len() + self.right.len();

        (len, Some(len))
    }
}
