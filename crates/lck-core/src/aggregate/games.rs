// Game-level distributions over team rows: side win rate, game duration,
// and first-objective conversion.

use crate::aggregate::percent;
use crate::model::{FirstObjective, Side, TeamRow};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideWinRate {
    pub side: Side,
    pub games: usize,
    pub wins: usize,
    pub win_rate: Option<f64>,
}

/// Win rate for blue and red side, always in that order.
pub fn side_win_rates(rows: &[&TeamRow]) -> Vec<SideWinRate> {
    [Side::Blue, Side::Red]
        .into_iter()
        .map(|side| {
            let on_side: Vec<&&TeamRow> = rows.iter().filter(|r| r.game.side == Some(side)).collect();
            let wins = on_side.iter().filter(|r| r.game.win).count();
            SideWinRate {
                side,
                games: on_side.len(),
                wins,
                win_rate: percent(wins, on_side.len()),
            }
        })
        .collect()
}

/// One equal-width histogram bin, `[lower, upper)` except the last, which
/// is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Game length in minutes binned into `bins` equal-width bins. Each game is
/// counted once even though it has a row per team. Empty when no game has a
/// recorded length.
pub fn duration_histogram(rows: &[&TeamRow], bins: usize) -> Vec<Bin> {
    let mut seen = HashSet::new();
    let minutes: Vec<f64> = rows
        .iter()
        .filter(|r| seen.insert(r.game.game_id.as_str()))
        .filter_map(|r| r.game.game_length)
        .map(|secs| secs / 60.0)
        .collect();

    histogram(&minutes, bins)
}

pub(crate) fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // A single distinct value gets one unit-wide bin around it.
    let (lo, width) = if max > min {
        (min, (max - min) / bins as f64)
    } else {
        (min - 0.5, 1.0 / bins as f64)
    };

    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// How often securing an objective first turned into a win.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstObjectiveRate {
    pub objective: FirstObjective,
    /// Games in which the team secured the objective first.
    pub games: usize,
    pub wins: usize,
    pub win_rate: Option<f64>,
}

/// Win rate of teams that secured each first objective, for every
/// objective with at least one recorded flag.
pub fn first_objective_win_rates(rows: &[&TeamRow]) -> Vec<FirstObjectiveRate> {
    FirstObjective::ALL
        .into_iter()
        .filter(|obj| rows.iter().any(|r| r.firsts.get(*obj).is_some()))
        .map(|objective| {
            let secured: Vec<&&TeamRow> = rows
                .iter()
                .filter(|r| r.firsts.get(objective) == Some(true))
                .collect();
            let wins = secured.iter().filter(|r| r.game.win).count();
            FirstObjectiveRate {
                objective,
                games: secured.len(),
                wins,
                win_rate: percent(wins, secured.len()),
            }
        })
        .collect()
}
