// Per-champion pick, ban and win rates over player rows.

use crate::aggregate::{desc, percent};
use crate::model::{PlayerRow, Position};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Pick/ban/win summary for one champion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionStat {
    pub champion: String,
    /// Positions the champion was played in, sorted.
    pub positions: Vec<Position>,
    /// Times picked.
    pub games: usize,
    pub wins: usize,
    /// Times banned, once per game side.
    pub bans: usize,
    pub pick_rate: Option<f64>,
    pub ban_rate: Option<f64>,
    pub pick_ban_rate: Option<f64>,
    /// Wins over picks; undefined for ban-only champions.
    pub win_rate: Option<f64>,
}

impl ChampionStat {
    /// Positions joined with `/`, e.g. `mid/bot`.
    pub fn positions_label(&self) -> String {
        self.positions
            .iter()
            .map(|p| p.display_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Default)]
struct Tally {
    positions: BTreeSet<Position>,
    games: usize,
    wins: usize,
    bans: usize,
}

/// Champion statistics over `rows`, sorted by games played descending
/// (ties by name).
///
/// The rate denominator is the number of distinct games in `rows`. Bans are
/// read from each distinct (game, team) pair so a side's bans are counted
/// once no matter how many of its players are in the selection.
pub fn champion_stats(rows: &[&PlayerRow]) -> Vec<ChampionStat> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut games: HashSet<&str> = HashSet::new();
    let mut sides: HashSet<(&str, &str)> = HashSet::new();

    for row in rows {
        games.insert(row.game.game_id.as_str());

        if let Some(champion) = row.champion.as_deref() {
            let tally = tallies.entry(champion).or_default();
            tally.positions.insert(row.position);
            tally.games += 1;
            if row.game.win {
                tally.wins += 1;
            }
        }

        if sides.insert((row.game.game_id.as_str(), row.game.team.as_str())) {
            for ban in &row.game.bans {
                tallies.entry(ban.as_str()).or_default().bans += 1;
            }
        }
    }

    let total = games.len();
    let mut stats: Vec<ChampionStat> = tallies
        .into_iter()
        .map(|(champion, t)| {
            let pick_rate = percent(t.games, total);
            let ban_rate = percent(t.bans, total);
            ChampionStat {
                champion: champion.to_string(),
                positions: t.positions.into_iter().collect(),
                games: t.games,
                wins: t.wins,
                bans: t.bans,
                pick_rate,
                ban_rate,
                pick_ban_rate: pick_rate.zip(ban_rate).map(|(p, b)| p + b),
                win_rate: percent(t.wins, t.games),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.games.cmp(&a.games));
    stats
}

/// Top `n` champions by pick-or-ban presence.
pub fn most_contested(stats: &[ChampionStat], n: usize) -> Vec<ChampionStat> {
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| desc(a.pick_ban_rate, b.pick_ban_rate));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply, FilterSelection};
    use crate::testdata::{self, approx_opt};

    fn find<'a>(stats: &'a [ChampionStat], name: &str) -> &'a ChampionStat {
        stats.iter().find(|s| s.champion == name).unwrap()
    }

    #[test]
    fn sorted_by_games_then_name() {
        let tables = testdata::tables();
        let rows: Vec<&PlayerRow> = tables.players.iter().collect();
        let stats = champion_stats(&rows);

        let names: Vec<&str> = stats.iter().map(|s| s.champion.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Aphelios", "Jinx", "Sylas", "Ahri", "Corki", "Kalista", "Orianna", "Taliyah",
                "Varus", "Azir", "Jayce", "Rell", "Yuumi", "Zeri"
            ]
        );
    }

    #[test]
    fn rates_use_distinct_games() {
        let tables = testdata::tables();
        let rows: Vec<&PlayerRow> = tables.players.iter().collect();
        let stats = champion_stats(&rows);

        let jinx = find(&stats, "Jinx");
        assert_eq!(jinx.games, 2);
        assert_eq!(jinx.bans, 1);
        assert!(approx_opt(jinx.pick_rate, 200.0 / 3.0));
        assert!(approx_opt(jinx.ban_rate, 100.0 / 3.0));
        assert!(approx_opt(jinx.pick_ban_rate, 100.0));
        assert!(approx_opt(jinx.win_rate, 50.0));
        assert_eq!(jinx.positions, vec![Position::Bot]);

        let sylas = find(&stats, "Sylas");
        assert_eq!(sylas.positions_label(), "mid");
        assert!(approx_opt(sylas.win_rate, 0.0));
    }

    #[test]
    fn ban_only_champion_has_zero_games_and_undefined_win_rate() {
        let tables = testdata::tables();
        let rows: Vec<&PlayerRow> = tables.players.iter().collect();
        let stats = champion_stats(&rows);

        let azir = find(&stats, "Azir");
        assert_eq!(azir.games, 0);
        assert_eq!(azir.bans, 3);
        assert!(approx_opt(azir.ban_rate, 100.0));
        assert!(approx_opt(azir.pick_rate, 0.0));
        assert_eq!(azir.win_rate, None);
        assert!(azir.positions.is_empty());
    }

    #[test]
    fn ten_picks_five_bans_in_twenty_games() {
        let template = testdata::tables().players[0].clone();
        let mut rows = Vec::new();
        for i in 0..20 {
            let mut row = template.clone();
            row.game.game_id = format!("X{i}");
            row.champion = Some(if i < 10 { "Azir" } else { "Ahri" }.to_string());
            row.game.bans = if i >= 15 { vec!["Azir".into()] } else { Vec::new() };
            rows.push(row);
        }
        let refs: Vec<&PlayerRow> = rows.iter().collect();
        let stats = champion_stats(&refs);

        let azir = find(&stats, "Azir");
        assert!(approx_opt(azir.pick_rate, 50.0));
        assert!(approx_opt(azir.ban_rate, 25.0));
        assert!(approx_opt(azir.pick_ban_rate, 75.0));
    }

    #[test]
    fn empty_selection_yields_no_stats() {
        let tables = testdata::tables();
        let selection = FilterSelection::new().with_teams(["T1"]).with_years([2030]);
        let rows = apply(&tables.players, &selection);
        assert!(champion_stats(&rows).is_empty());
    }

    #[test]
    fn most_contested_ranks_by_pick_plus_ban() {
        let tables = testdata::tables();
        let rows: Vec<&PlayerRow> = tables.players.iter().collect();
        let stats = champion_stats(&rows);
        let top = most_contested(&stats, 5);

        assert_eq!(top.len(), 5);
        assert!(approx_opt(top[0].pick_ban_rate, 100.0));
        assert!(top
            .windows(2)
            .all(|w| w[0].pick_ban_rate >= w[1].pick_ban_rate));
        assert_eq!(most_contested(&stats, 50).len(), stats.len());
    }
}
