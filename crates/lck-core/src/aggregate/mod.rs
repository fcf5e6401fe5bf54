// Aggregation engine.
//
// A generic group-by over named metrics lives here; the page-specific
// aggregations (champion rates, draft tallies, game-level distributions,
// player and team profiles, comparisons) live in the submodules.

pub mod champions;
pub mod compare;
pub mod draft;
pub mod games;
pub mod player;
pub mod team;

use crate::filter::Filterable;
use crate::model::{kda, PlayerRow, TeamRow};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Rate helpers
// ---------------------------------------------------------------------------

/// `numer / denom` as a percentage, undefined when `denom` is zero.
pub fn percent(numer: usize, denom: usize) -> Option<f64> {
    if denom == 0 {
        None
    } else {
        Some(numer as f64 / denom as f64 * 100.0)
    }
}

/// Arithmetic mean, undefined for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Descending comparison for optional values; `None` sorts last.
pub(crate) fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Empty selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Entity {
    Player,
    Team,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Player => write!(f, "player"),
            Entity::Team => write!(f, "team"),
        }
    }
}

/// The selected player or team has no rows under the current filter.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("no games for {entity} '{name}' in the current filter")]
pub struct EmptySelection {
    pub entity: Entity,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Grouping key for [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupKey {
    Player,
    Team,
    Champion,
    Position,
    Side,
    Year,
    Split,
    Patch,
}

/// A named metric computed over a group of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    Games,
    Wins,
    WinRate,
    Kills,
    Deaths,
    Assists,
    /// Mean of per-game KDA.
    Kda,
    /// `(Σkills + Σassists) / max(Σdeaths, 1)` over the group.
    PooledKda,
    Dpm,
    EarnedGpm,
    Vspm,
    Cspm,
    VisionScore,
    GoldDiffAt(u32),
    CsDiffAt(u32),
    Towers,
    Inhibitors,
    Dragons,
    Barons,
    VoidGrubs,
    Atakhans,
}

impl Metric {
    pub fn label(&self) -> String {
        match self {
            Metric::Games => "Games".into(),
            Metric::Wins => "Wins".into(),
            Metric::WinRate => "Win%".into(),
            Metric::Kills => "Kills".into(),
            Metric::Deaths => "Deaths".into(),
            Metric::Assists => "Assists".into(),
            Metric::Kda | Metric::PooledKda => "KDA".into(),
            Metric::Dpm => "DPM".into(),
            Metric::EarnedGpm => "Earned GPM".into(),
            Metric::Vspm => "VSPM".into(),
            Metric::Cspm => "CSPM".into(),
            Metric::VisionScore => "Vision Score".into(),
            Metric::GoldDiffAt(m) => format!("GD@{m}"),
            Metric::CsDiffAt(m) => format!("CSD@{m}"),
            Metric::Towers => "Towers".into(),
            Metric::Inhibitors => "Inhibitors".into(),
            Metric::Dragons => "Dragons".into(),
            Metric::Barons => "Barons".into(),
            Metric::VoidGrubs => "Void Grubs".into(),
            Metric::Atakhans => "Atakhans".into(),
        }
    }

    pub fn is_rate(&self) -> bool {
        matches!(self, Metric::WinRate)
    }

    pub fn is_count(&self) -> bool {
        matches!(self, Metric::Games | Metric::Wins)
    }
}

/// Row types that expose per-game metric values.
pub trait MetricSource: Filterable {
    /// The per-row value of `metric`. Group-level metrics (games, wins,
    /// rates, pooled KDA) and metrics the row type does not carry are `None`.
    fn row_value(&self, metric: Metric) -> Option<f64>;

    fn kda_parts(&self) -> (u32, u32, u32);

    fn group_value(&self, key: GroupKey) -> Option<String> {
        let g = self.game();
        match key {
            GroupKey::Player => self.player().map(str::to_string),
            GroupKey::Team => Some(g.team.clone()),
            GroupKey::Champion => self.champion().map(str::to_string),
            GroupKey::Position => self.position().map(|p| p.display_str().to_string()),
            GroupKey::Side => g.side.map(|s| s.display_str().to_string()),
            GroupKey::Year => g.year.map(|y| y.to_string()),
            GroupKey::Split => g.split.clone(),
            GroupKey::Patch => g.patch.clone(),
        }
    }
}

impl MetricSource for PlayerRow {
    fn row_value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Kills => Some(self.kills as f64),
            Metric::Deaths => Some(self.deaths as f64),
            Metric::Assists => Some(self.assists as f64),
            Metric::Kda => Some(self.kda),
            Metric::Dpm => self.dpm,
            Metric::EarnedGpm => self.earned_gpm,
            Metric::Vspm => self.vspm,
            Metric::Cspm => self.cspm,
            Metric::VisionScore => self.vision_score,
            Metric::GoldDiffAt(m) => self.diffs.gold_at(m),
            Metric::CsDiffAt(m) => self.diffs.cs_at(m),
            _ => None,
        }
    }

    fn kda_parts(&self) -> (u32, u32, u32) {
        (self.kills, self.deaths, self.assists)
    }
}

impl MetricSource for TeamRow {
    fn row_value(&self, metric: Metric) -> Option<f64> {
        let o = &self.objectives;
        match metric {
            Metric::Kills => Some(self.kills as f64),
            Metric::Deaths => Some(self.deaths as f64),
            Metric::Assists => Some(self.assists as f64),
            Metric::Kda => Some(kda(self.kills, self.deaths, self.assists)),
            Metric::Dpm => self.dpm,
            Metric::EarnedGpm => self.earned_gpm,
            Metric::Vspm => self.vspm,
            Metric::GoldDiffAt(m) => self.diffs.gold_at(m),
            Metric::CsDiffAt(m) => self.diffs.cs_at(m),
            Metric::Towers => o.towers,
            Metric::Inhibitors => o.inhibitors,
            Metric::Dragons => o.dragons,
            Metric::Barons => o.barons,
            Metric::VoidGrubs => o.void_grubs,
            Metric::Atakhans => o.atakhans,
            _ => None,
        }
    }

    fn kda_parts(&self) -> (u32, u32, u32) {
        (self.kills, self.deaths, self.assists)
    }
}

/// The value of `metric` over one group of rows.
pub fn metric_value<R: MetricSource>(rows: &[&R], metric: Metric) -> Option<f64> {
    let games = rows.len();
    let wins = rows.iter().filter(|r| r.game().win).count();
    match metric {
        Metric::Games => Some(games as f64),
        Metric::Wins => Some(wins as f64),
        Metric::WinRate => percent(wins, games),
        Metric::PooledKda => {
            if games == 0 {
                return None;
            }
            let (k, d, a) = rows.iter().fold((0, 0, 0), |(k, d, a), r| {
                let (rk, rd, ra) = r.kda_parts();
                (k + rk, d + rd, a + ra)
            });
            Some(kda(k, d, a))
        }
        m => mean(rows.iter().filter_map(|r| r.row_value(m))),
    }
}

/// Values of several metrics over one group, in the order given.
pub fn summarize<R: MetricSource>(rows: &[&R], metrics: &[Metric]) -> Vec<(Metric, Option<f64>)> {
    metrics.iter().map(|m| (*m, metric_value(rows, *m))).collect()
}

// ---------------------------------------------------------------------------
// Generic group-by
// ---------------------------------------------------------------------------

/// What to group by, which metrics to compute, and how to order the groups.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSpec {
    pub key: GroupKey,
    pub metrics: Vec<Metric>,
    /// Sort descending by this metric; `None` means by games played.
    pub sort_by: Option<Metric>,
}

impl AggregationSpec {
    pub fn new(key: GroupKey, metrics: Vec<Metric>) -> Self {
        AggregationSpec {
            key,
            metrics,
            sort_by: None,
        }
    }

    pub fn sorted_by(mut self, metric: Metric) -> Self {
        self.sort_by = Some(metric);
        self
    }
}

/// One group of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: String,
    pub games: usize,
    pub values: Vec<(Metric, Option<f64>)>,
}

impl SummaryRow {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        if metric == Metric::Games {
            return Some(self.games as f64);
        }
        self.values
            .iter()
            .find(|(m, _)| *m == metric)
            .and_then(|(_, v)| *v)
    }
}

/// Group `rows` by `spec.key` and compute `spec.metrics` per group.
///
/// Rows without a value for the key are left out. Groups are ordered by the
/// sort metric descending, undefined values last, ties by key ascending.
pub fn aggregate<R: MetricSource>(rows: &[&R], spec: &AggregationSpec) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<String, Vec<&R>> = BTreeMap::new();
    for row in rows {
        if let Some(key) = row.group_value(spec.key) {
            groups.entry(key).or_default().push(*row);
        }
    }

    let sort_by = spec.sort_by.unwrap_or(Metric::Games);
    let mut summary: Vec<SummaryRow> = groups
        .into_iter()
        .map(|(key, group)| SummaryRow {
            key,
            games: group.len(),
            values: summarize(&group, &spec.metrics),
        })
        .collect();

    // Stable sort over key-ordered groups keeps ties by key.
    summary.sort_by(|a, b| desc(a.get(sort_by), b.get(sort_by)));
    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{self, approx, approx_opt};

    #[test]
    fn percent_is_undefined_for_zero_denominator() {
        assert_eq!(percent(0, 0), None);
        assert_eq!(percent(3, 0), None);
        assert!(approx_opt(percent(10, 20), 50.0));
        assert!(approx_opt(percent(5, 20), 25.0));
    }

    #[test]
    fn mean_of_nothing_is_undefined() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert!(approx_opt(mean([1.0, 2.0, 6.0]), 3.0));
    }

    #[test]
    fn empty_group_rates_are_undefined_not_infinite() {
        let rows: Vec<&PlayerRow> = Vec::new();
        assert_eq!(metric_value(&rows, Metric::Games), Some(0.0));
        assert_eq!(metric_value(&rows, Metric::WinRate), None);
        assert_eq!(metric_value(&rows, Metric::PooledKda), None);
        assert_eq!(metric_value(&rows, Metric::Dpm), None);
    }

    #[test]
    fn group_by_player_computes_win_rate_and_means() {
        let tables = testdata::tables();
        let rows: Vec<&PlayerRow> = tables.players.iter().collect();
        let spec = AggregationSpec::new(
            GroupKey::Player,
            vec![Metric::Wins, Metric::WinRate, Metric::Kda, Metric::Dpm],
        )
        .sorted_by(Metric::WinRate);

        let summary = aggregate(&rows, &spec);
        assert_eq!(summary.len(), 6);

        // Faker and Gumayusi both 2/3; Faker first on key order.
        assert_eq!(summary[0].key, "Faker");
        assert_eq!(summary[1].key, "Gumayusi");
        assert_eq!(summary[0].games, 3);
        assert!(approx_opt(summary[0].get(Metric::WinRate), 200.0 / 3.0));
        assert!(approx_opt(summary[0].get(Metric::Kda), 25.0 / 3.0));
        assert!(approx_opt(summary[0].get(Metric::Dpm), 1700.0 / 3.0));

        let last = summary.last().unwrap();
        assert!(approx_opt(last.get(Metric::WinRate), 0.0));
    }

    #[test]
    fn default_sort_is_games_descending() {
        let tables = testdata::tables();
        let rows: Vec<&PlayerRow> = tables.players.iter().collect();
        let spec = AggregationSpec::new(GroupKey::Champion, vec![Metric::Wins]);

        let summary = aggregate(&rows, &spec);
        let keys: Vec<&str> = summary.iter().take(3).map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Aphelios", "Jinx", "Sylas"]);
        assert_eq!(summary[0].games, 2);
    }

    #[test]
    fn pooled_kda_uses_sums_for_teams() {
        let tables = testdata::tables();
        let t1: Vec<&TeamRow> = tables.teams.iter().filter(|t| t.game.team == "T1").collect();
        let kda = metric_value(&t1, Metric::PooledKda).unwrap();
        assert!(approx(kda, 54.0 / 11.0));
        assert!(approx_opt(metric_value(&t1, Metric::Dpm), 1290.0));
    }

    #[test]
    fn team_rows_group_by_side() {
        let tables = testdata::tables();
        let rows: Vec<&TeamRow> = tables.teams.iter().collect();
        let spec = AggregationSpec::new(GroupKey::Side, vec![Metric::WinRate]);

        let summary = aggregate(&rows, &spec);
        assert_eq!(summary.len(), 2);
        let blue = summary.iter().find(|r| r.key == "Blue").unwrap();
        assert!(approx_opt(blue.get(Metric::WinRate), 100.0));
    }

    #[test]
    fn metric_labels_name_the_minute() {
        assert_eq!(Metric::GoldDiffAt(15).label(), "GD@15");
        assert_eq!(Metric::WinRate.label(), "Win%");
    }
}
