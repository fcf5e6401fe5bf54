// Team-level draft tallies: picks, bans and pick outcomes per champion.

use crate::aggregate::{desc, percent};
use crate::model::TeamRow;
use serde::Serialize;
use std::collections::BTreeMap;

/// Draft outcome counts for one champion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftStat {
    pub champion: String,
    pub picks: usize,
    pub wins: usize,
    pub losses: usize,
    pub bans: usize,
    pub win_rate: Option<f64>,
    pub loss_rate: Option<f64>,
}

/// The four ranked lists shown on the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSummary {
    pub most_picked: Vec<DraftStat>,
    pub most_banned: Vec<DraftStat>,
    /// Ranked among champions with at least `min_games` picks.
    pub highest_win_rate: Vec<DraftStat>,
    pub highest_loss_rate: Vec<DraftStat>,
    pub min_games: usize,
}

/// Per-champion tallies over team rows, sorted by picks descending (ties by
/// name). Every champion picked or banned at least once is listed.
pub fn draft_stats(rows: &[&TeamRow]) -> Vec<DraftStat> {
    #[derive(Default)]
    struct Counts {
        picks: usize,
        wins: usize,
        bans: usize,
    }

    let mut counts: BTreeMap<&str, Counts> = BTreeMap::new();
    for row in rows {
        for pick in &row.picks {
            let c = counts.entry(pick.as_str()).or_default();
            c.picks += 1;
            if row.game.win {
                c.wins += 1;
            }
        }
        for ban in &row.game.bans {
            counts.entry(ban.as_str()).or_default().bans += 1;
        }
    }

    let mut stats: Vec<DraftStat> = counts
        .into_iter()
        .map(|(champion, c)| DraftStat {
            champion: champion.to_string(),
            picks: c.picks,
            wins: c.wins,
            losses: c.picks - c.wins,
            bans: c.bans,
            win_rate: percent(c.wins, c.picks),
            loss_rate: percent(c.picks - c.wins, c.picks),
        })
        .collect();
    stats.sort_by(|a, b| b.picks.cmp(&a.picks));
    stats
}

/// Top-`top_n` lists by picks, bans, win rate and loss rate.
pub fn draft_summary(rows: &[&TeamRow], top_n: usize, min_games: usize) -> DraftSummary {
    let stats = draft_stats(rows);

    let most_picked: Vec<DraftStat> = stats
        .iter()
        .filter(|s| s.picks > 0)
        .take(top_n)
        .cloned()
        .collect();

    let mut by_bans: Vec<DraftStat> = stats.iter().filter(|s| s.bans > 0).cloned().collect();
    by_bans.sort_by(|a, b| b.bans.cmp(&a.bans).then_with(|| a.champion.cmp(&b.champion)));
    by_bans.truncate(top_n);

    let qualified: Vec<&DraftStat> = stats
        .iter()
        .filter(|s| s.picks > 0 && s.picks >= min_games)
        .collect();
    let ranked = |rate: fn(&DraftStat) -> Option<f64>| {
        let mut list: Vec<DraftStat> = qualified.iter().map(|s| (*s).clone()).collect();
        list.sort_by(|a, b| desc(rate(a), rate(b)).then_with(|| a.champion.cmp(&b.champion)));
        list.truncate(top_n);
        list
    };

    DraftSummary {
        most_picked,
        most_banned: by_bans,
        highest_win_rate: ranked(|s| s.win_rate),
        highest_loss_rate: ranked(|s| s.loss_rate),
        min_games,
    }
}
