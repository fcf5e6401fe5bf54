// Team profile: summary metrics, league-normalized radar, laning phase, and
// objective control.

use crate::aggregate::games::{first_objective_win_rates, FirstObjectiveRate};
use crate::aggregate::{mean, metric_value, percent, EmptySelection, Entity, Metric, MetricSource};
use crate::model::{FirstObjective, TeamRow, LANE_MINUTES};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metrics compared between teams and plotted on the league radar.
pub const TEAM_METRICS: [Metric; 4] = [Metric::PooledKda, Metric::Dpm, Metric::EarnedGpm, Metric::Vspm];

/// Objective counts averaged per game on the profile.
pub const OBJECTIVE_METRICS: [Metric; 6] = [
    Metric::Inhibitors,
    Metric::Towers,
    Metric::Dragons,
    Metric::Barons,
    Metric::VoidGrubs,
    Metric::Atakhans,
];

/// Objectives whose per-game count is split into win rate by count.
pub const COUNTED_OBJECTIVES: [Metric; 4] = [
    Metric::VoidGrubs,
    Metric::Dragons,
    Metric::Barons,
    Metric::Atakhans,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub team: String,
    pub games: usize,
    pub wins: usize,
    pub win_rate: Option<f64>,
    pub metrics: Vec<(Metric, Option<f64>)>,
    pub objectives: Vec<(Metric, Option<f64>)>,
    /// Share of games in which the team secured each objective first.
    pub first_rates: Vec<(FirstObjective, Option<f64>)>,
}

/// Values of [`TEAM_METRICS`] over `rows`.
pub fn team_metrics(rows: &[&TeamRow]) -> Vec<(Metric, Option<f64>)> {
    TEAM_METRICS
        .iter()
        .map(|m| (*m, metric_value(rows, *m)))
        .collect()
}

/// Rows belonging to `team`.
pub fn rows_for<'a>(rows: &[&'a TeamRow], team: &str) -> Vec<&'a TeamRow> {
    rows.iter().copied().filter(|r| r.game.team == team).collect()
}

pub fn team_summary(rows: &[&TeamRow], team: &str) -> Result<TeamSummary, EmptySelection> {
    let own = rows_for(rows, team);
    if own.is_empty() {
        return Err(EmptySelection {
            entity: Entity::Team,
            name: team.to_string(),
        });
    }

    let wins = own.iter().filter(|r| r.game.win).count();
    let first_rates = FirstObjective::ALL
        .into_iter()
        .filter_map(|obj| {
            let recorded: Vec<bool> = own.iter().filter_map(|r| r.firsts.get(obj)).collect();
            if recorded.is_empty() {
                return None;
            }
            let secured = recorded.iter().filter(|v| **v).count();
            Some((obj, percent(secured, recorded.len())))
        })
        .collect();

    Ok(TeamSummary {
        team: team.to_string(),
        games: own.len(),
        wins,
        win_rate: percent(wins, own.len()),
        metrics: team_metrics(&own),
        objectives: OBJECTIVE_METRICS
            .iter()
            .map(|m| (*m, metric_value(&own, *m)))
            .collect(),
        first_rates,
    })
}

// ---------------------------------------------------------------------------
// League radar
// ---------------------------------------------------------------------------

/// One radar axis: raw values plus their position between the weakest and
/// strongest team means in the league.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub metric: Metric,
    pub team: Option<f64>,
    pub league: Option<f64>,
    pub team_normalized: f64,
    pub league_normalized: f64,
}

fn normalize(value: Option<f64>, min: f64, max: f64) -> f64 {
    match value {
        Some(v) if max > min => ((v - min) / (max - min)).clamp(0.0, 1.0),
        _ => 0.5,
    }
}

/// Radar of [`TEAM_METRICS`] for `team` against the league, where `rows`
/// holds every team in the current filter. Each axis is scaled to the min
/// and max of the per-team values; a flat axis sits at 0.5.
pub fn league_radar(rows: &[&TeamRow], team: &str) -> Vec<RadarAxis> {
    let mut by_team: BTreeMap<&str, Vec<&TeamRow>> = BTreeMap::new();
    for row in rows {
        by_team.entry(row.game.team.as_str()).or_default().push(*row);
    }
    let own = rows_for(rows, team);

    TEAM_METRICS
        .iter()
        .map(|metric| {
            let per_team: Vec<f64> = by_team
                .values()
                .filter_map(|group| metric_value(group, *metric))
                .collect();
            let min = per_team.iter().copied().fold(f64::INFINITY, f64::min);
            let max = per_team.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            let team_value = metric_value(&own, *metric);
            let league_value = metric_value(rows, *metric);
            RadarAxis {
                metric: *metric,
                team: team_value,
                league: league_value,
                team_normalized: normalize(team_value, min, max),
                league_normalized: normalize(league_value, min, max),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Laning phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaningPoint {
    pub minute: u32,
    /// Signed mean difference for the team.
    pub gold_diff: Option<f64>,
    pub cs_diff: Option<f64>,
    /// League reference: `Σ|diff| / (2n)` where `n` counts the team rows
    /// that record the value.
    pub league_gold: Option<f64>,
    pub league_cs: Option<f64>,
}

/// Half the mean absolute difference. Rows missing the value are left out of
/// both the sum and the count; no recorded value gives `None`.
fn league_abs(values: impl Iterator<Item = f64>) -> Option<f64> {
    mean(values.map(f64::abs)).map(|m| m / 2.0)
}

/// Team gold and CS differences at each tracked minute, next to the
/// league's adjusted absolute average.
pub fn laning_phase(rows: &[&TeamRow], team: &str) -> Vec<LaningPoint> {
    let own = rows_for(rows, team);
    LANE_MINUTES
        .iter()
        .map(|&minute| LaningPoint {
            minute,
            gold_diff: metric_value(&own, Metric::GoldDiffAt(minute)),
            cs_diff: metric_value(&own, Metric::CsDiffAt(minute)),
            league_gold: league_abs(rows.iter().filter_map(|r| r.diffs.gold_at(minute))),
            league_cs: league_abs(rows.iter().filter_map(|r| r.diffs.cs_at(minute))),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Objective control
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountWinRate {
    pub count: u32,
    pub games: usize,
    pub win_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveControl {
    pub first_objectives: Vec<FirstObjectiveRate>,
    /// Win rate by number taken, per counted objective.
    pub by_count: Vec<(Metric, Vec<CountWinRate>)>,
}

/// Win rate split by how many of `metric` the team took; missing counts
/// are treated as zero.
pub fn win_rate_by_count(rows: &[&TeamRow], metric: Metric) -> Vec<CountWinRate> {
    let mut groups: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for row in rows {
        let n = row
            .row_value(metric)
            .map_or(0, |v| v.max(0.0).round() as u32);
        let entry = groups.entry(n).or_default();
        entry.0 += 1;
        if row.game.win {
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(count, (games, wins))| CountWinRate {
            count,
            games,
            win_rate: percent(wins, games),
        })
        .collect()
}

pub fn objective_control(rows: &[&TeamRow], team: &str) -> ObjectiveControl {
    let own = rows_for(rows, team);
    ObjectiveControl {
        first_objectives: first_objective_win_rates(&own),
        by_count: COUNTED_OBJECTIVES
            .iter()
            .filter(|m| own.iter().any(|r| r.row_value(**m).is_some()))
            .map(|m| (*m, win_rate_by_count(&own, *m)))
            .collect(),
    }
}
