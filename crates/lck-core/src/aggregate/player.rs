// Player profile: identity, headline metrics, most-played champions, and
// the offline factor and cluster lookups.

use crate::aggregate::{metric_value, percent, EmptySelection, Entity, Metric};
use crate::filter::{apply, FilterSelection};
use crate::loader::Dataset;
use crate::model::{PlayerRow, Position, LANE_MINUTES};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Metrics shown on the profile header and compared between players.
pub const HEADLINE_METRICS: [Metric; 4] = [Metric::Kda, Metric::Dpm, Metric::EarnedGpm, Metric::Vspm];

/// One row of the most-played champions table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionUsage {
    pub champion: String,
    pub games: usize,
    pub wins: usize,
    pub win_rate: Option<f64>,
    pub kda: Option<f64>,
    /// Mean gold difference at each of [`LANE_MINUTES`].
    pub gold_diff: Vec<(u32, Option<f64>)>,
    pub cspm: Option<f64>,
    pub dpm: Option<f64>,
    pub vision_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub player: String,
    /// Team of the player's most recent game in the selection.
    pub team: String,
    /// Most frequently played position.
    pub position: Position,
    pub games: usize,
    pub wins: usize,
    pub win_rate: Option<f64>,
    pub headline: Vec<(Metric, f64)>,
    pub most_played: Vec<ChampionUsage>,
    /// Named factor scores, `None` when the player is not in the factor table.
    pub factors: Option<Vec<(String, f64)>>,
    pub cluster: Option<u32>,
}

/// Means of [`HEADLINE_METRICS`] over `rows`, 0.0 where nothing is recorded.
pub fn headline_metrics(rows: &[&PlayerRow]) -> Vec<(Metric, f64)> {
    HEADLINE_METRICS
        .iter()
        .map(|m| (*m, metric_value(rows, *m).unwrap_or(0.0)))
        .collect()
}

/// The `n` champions with the most games, ties by name.
pub fn most_played(rows: &[&PlayerRow], n: usize) -> Vec<ChampionUsage> {
    let mut by_champion: BTreeMap<&str, Vec<&PlayerRow>> = BTreeMap::new();
    for row in rows {
        if let Some(champion) = row.champion.as_deref() {
            by_champion.entry(champion).or_default().push(*row);
        }
    }

    let mut usage: Vec<ChampionUsage> = by_champion
        .into_iter()
        .map(|(champion, games)| {
            let wins = games.iter().filter(|r| r.game.win).count();
            ChampionUsage {
                champion: champion.to_string(),
                games: games.len(),
                wins,
                win_rate: percent(wins, games.len()),
                kda: metric_value(&games, Metric::Kda),
                gold_diff: LANE_MINUTES
                    .iter()
                    .map(|m| (*m, metric_value(&games, Metric::GoldDiffAt(*m))))
                    .collect(),
                cspm: metric_value(&games, Metric::Cspm),
                dpm: metric_value(&games, Metric::Dpm),
                vision_score: metric_value(&games, Metric::VisionScore),
            }
        })
        .collect();

    usage.sort_by(|a, b| b.games.cmp(&a.games));
    usage.truncate(n);
    usage
}

fn primary_position(rows: &[&PlayerRow]) -> Option<Position> {
    let mut counts: HashMap<Position, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.position).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(pa, ca), (pb, cb)| ca.cmp(cb).then_with(|| pb.cmp(pa)))
        .map(|(p, _)| p)
}

fn latest_team(rows: &[&PlayerRow]) -> Option<String> {
    rows.iter()
        .enumerate()
        .max_by_key(|(i, r)| (r.game.date, *i))
        .map(|(_, r)| r.game.team.clone())
}

/// Rows for `player` under the session-wide dimensions of `selection`.
pub fn player_rows<'a>(
    dataset: &'a Dataset,
    selection: &FilterSelection,
    player: &str,
) -> Vec<&'a PlayerRow> {
    apply(&dataset.players, &selection.global_only().only_player(player))
}

/// Build the profile for `player`. Fails with [`EmptySelection`] when the
/// player has no games under the selection.
pub fn player_summary(
    dataset: &Dataset,
    selection: &FilterSelection,
    player: &str,
    most_played_n: usize,
) -> Result<PlayerSummary, EmptySelection> {
    let rows = player_rows(dataset, selection, player);
    let empty = || EmptySelection {
        entity: Entity::Player,
        name: player.to_string(),
    };
    let position = primary_position(&rows).ok_or_else(empty)?;
    let team = latest_team(&rows).ok_or_else(empty)?;

    let wins = rows.iter().filter(|r| r.game.win).count();
    let player_id = rows.iter().find_map(|r| r.player_id.as_deref());
    let factors = dataset
        .factors
        .scores_for(player)
        .or_else(|| player_id.and_then(|id| dataset.factors.scores_for(id)));
    let cluster = dataset
        .clusters
        .get(player)
        .or_else(|| player_id.and_then(|id| dataset.clusters.get(id)));

    Ok(PlayerSummary {
        player: player.to_string(),
        team,
        position,
        games: rows.len(),
        wins,
        win_rate: percent(wins, rows.len()),
        headline: headline_metrics(&rows),
        most_played: most_played(&rows, most_played_n),
        factors,
        cluster,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{self, approx, approx_opt};

    #[test]
    fn faker_profile_from_sample() {
        let dataset = testdata::dataset();
        let summary = player_summary(&dataset, &FilterSelection::new(), "Faker", 5).unwrap();

        assert_eq!(summary.team, "T1");
        assert_eq!(summary.position, Position::Mid);
        assert_eq!(summary.games, 3);
        assert_eq!(summary.wins, 2);
        assert!(approx_opt(summary.win_rate, 200.0 / 3.0));
        assert_eq!(summary.headline[0].0, Metric::Kda);
        assert!(approx(summary.headline[0].1, 25.0 / 3.0));
        assert_eq!(summary.cluster, Some(2));

        let factors = summary.factors.unwrap();
        assert_eq!(factors.len(), 4);
        assert_eq!(factors[0], ("Resource & Vision".to_string(), 62.5));
    }

    #[test]
    fn most_played_ties_break_by_name() {
        let dataset = testdata::dataset();
        let summary = player_summary(&dataset, &FilterSelection::new(), "Faker", 2).unwrap();

        let names: Vec<&str> = summary
            .most_played
            .iter()
            .map(|u| u.champion.as_str())
            .collect();
        assert_eq!(names, vec!["Orianna", "Sylas"]);

        let orianna = &summary.most_played[0];
        assert_eq!(orianna.games, 1);
        assert!(approx_opt(orianna.win_rate, 100.0));
        assert_eq!(orianna.gold_diff[0], (10, Some(300.0)));
        assert_eq!(orianna.gold_diff[3], (25, None));
        assert!(approx_opt(orianna.vision_score, 30.0));
    }

    #[test]
    fn page_dimensions_do_not_narrow_the_profile() {
        let dataset = testdata::dataset();
        let selection = FilterSelection::new()
            .with_years([2023])
            .with_champions(["Orianna"]);
        let summary = player_summary(&dataset, &selection, "Faker", 5).unwrap();
        assert_eq!(summary.games, 2);
    }

    #[test]
    fn no_games_in_filter_is_an_empty_selection() {
        let dataset = testdata::dataset();
        let selection = FilterSelection::new().with_years([2024]);
        let err = player_summary(&dataset, &selection, "Chovy", 5).unwrap_err();

        assert_eq!(err.entity, Entity::Player);
        assert_eq!(err.name, "Chovy");
    }

    #[test]
    fn missing_factor_row_leaves_radar_empty() {
        let dataset = testdata::dataset();
        let summary = player_summary(&dataset, &FilterSelection::new(), "Peyz", 5).unwrap();
        assert!(summary.factors.is_none());
        assert!(summary.cluster.is_none());
    }

    #[test]
    fn offline_tables_keyed_by_player_id_are_found() {
        let mut dataset = testdata::dataset();
        for row in dataset.players.iter_mut().filter(|r| r.player == "Peyz") {
            row.player_id = Some("P042".to_string());
        }
        dataset.clusters.labels.insert("P042".to_string(), 4);

        let summary = player_summary(&dataset, &FilterSelection::new(), "Peyz", 5).unwrap();
        assert_eq!(summary.cluster, Some(4));
        // Name keys still win over id keys.
        dataset.clusters.labels.insert("Peyz".to_string(), 1);
        let summary = player_summary(&dataset, &FilterSelection::new(), "Peyz", 5).unwrap();
        assert_eq!(summary.cluster, Some(1));
    }

    #[test]
    fn headline_defaults_to_zero_when_unrecorded() {
        let rows: Vec<&PlayerRow> = Vec::new();
        let headline = headline_metrics(&rows);
        assert_eq!(headline.len(), 4);
        assert!(headline.iter().all(|(_, v)| *v == 0.0));
    }
}
