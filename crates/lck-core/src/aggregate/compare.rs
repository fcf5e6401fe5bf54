// Side-by-side comparison and head-to-head records for players and teams.

use crate::aggregate::Metric;
use crate::filter::Filterable;
use crate::model::{PlayerRow, Position, TeamRow};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Metric differences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDelta {
    pub metric: Metric,
    pub a: f64,
    pub b: f64,
    /// `a - b`.
    pub diff: f64,
}

/// Per-metric differences between two metric lists, sorted by absolute
/// difference descending. Metrics missing on one side count as 0.0.
pub fn metric_deltas(a: &[(Metric, f64)], b: &[(Metric, f64)]) -> Vec<MetricDelta> {
    let lookup = |list: &[(Metric, f64)], m: Metric| {
        list.iter()
            .find(|(k, _)| *k == m)
            .map_or(0.0, |(_, v)| *v)
    };

    let mut metrics: Vec<Metric> = a.iter().map(|(m, _)| *m).collect();
    for (m, _) in b {
        if !metrics.contains(m) {
            metrics.push(*m);
        }
    }

    let mut deltas: Vec<MetricDelta> = metrics
        .into_iter()
        .map(|metric| {
            let (va, vb) = (lookup(a, metric), lookup(b, metric));
            MetricDelta {
                metric,
                a: va,
                b: vb,
                diff: va - vb,
            }
        })
        .collect();
    deltas.sort_by(|x, y| {
        y.diff
            .abs()
            .partial_cmp(&x.diff.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    deltas
}

/// Players who share `position` with the selected player, excluding the
/// player, sorted by name.
pub fn eligible_opponents(rows: &[&PlayerRow], player: &str, position: Position) -> Vec<String> {
    rows.iter()
        .filter(|r| r.position == position && r.player != player)
        .map(|r| r.player.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// Head-to-head
// ---------------------------------------------------------------------------

/// One game in which both sides of a comparison played against each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub game_id: String,
    pub date: Option<NaiveDateTime>,
    pub a_team: String,
    pub b_team: String,
    pub a_won: bool,
    pub a_champion: Option<String>,
    pub b_champion: Option<String>,
}

impl Fixture {
    fn swapped(&self) -> Fixture {
        Fixture {
            game_id: self.game_id.clone(),
            date: self.date,
            a_team: self.b_team.clone(),
            b_team: self.a_team.clone(),
            a_won: !self.a_won,
            a_champion: self.b_champion.clone(),
            b_champion: self.a_champion.clone(),
        }
    }
}

/// Record of A against B over the games they met.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub a: String,
    pub b: String,
    pub games: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    /// Ordered by date, then game id.
    pub fixtures: Vec<Fixture>,
}

impl HeadToHead {
    /// The same record seen from B's side.
    pub fn swapped(&self) -> HeadToHead {
        HeadToHead {
            a: self.b.clone(),
            b: self.a.clone(),
            games: self.games,
            a_wins: self.b_wins,
            b_wins: self.a_wins,
            fixtures: self.fixtures.iter().map(Fixture::swapped).collect(),
        }
    }
}

fn head_to_head<R, K>(rows: &[&R], a: &str, b: &str, key: K) -> HeadToHead
where
    R: Filterable,
    K: Fn(&R) -> Option<&str>,
{
    let mut by_game: BTreeMap<&str, (Option<&R>, Option<&R>)> = BTreeMap::new();
    for row in rows {
        let side = match key(*row) {
            Some(k) if k == a => 0,
            Some(k) if k == b => 1,
            _ => continue,
        };
        let entry = by_game.entry(row.game().game_id.as_str()).or_default();
        if side == 0 {
            entry.0 = Some(*row);
        } else {
            entry.1 = Some(*row);
        }
    }

    let mut fixtures: Vec<Fixture> = by_game
        .into_values()
        .filter_map(|pair| match pair {
            (Some(ra), Some(rb)) if ra.game().team != rb.game().team => Some(Fixture {
                game_id: ra.game().game_id.clone(),
                date: ra.game().date,
                a_team: ra.game().team.clone(),
                b_team: rb.game().team.clone(),
                a_won: ra.game().win,
                a_champion: ra.champion().map(str::to_string),
                b_champion: rb.champion().map(str::to_string),
            }),
            _ => None,
        })
        .collect();
    fixtures.sort_by(|x, y| (x.date, &x.game_id).cmp(&(y.date, &y.game_id)));

    let a_wins = fixtures.iter().filter(|f| f.a_won).count();
    HeadToHead {
        a: a.to_string(),
        b: b.to_string(),
        games: fixtures.len(),
        a_wins,
        b_wins: fixtures.len() - a_wins,
        fixtures,
    }
}

/// Games in which players `a` and `b` were on opposite teams.
pub fn player_head_to_head(rows: &[&PlayerRow], a: &str, b: &str) -> HeadToHead {
    head_to_head(rows, a, b, |r| Some(r.player.as_str()))
}

/// Games between teams `a` and `b`.
pub fn team_head_to_head(rows: &[&TeamRow], a: &str, b: &str) -> HeadToHead {
    head_to_head(rows, a, b, |r| Some(r.game.team.as_str()))
}
