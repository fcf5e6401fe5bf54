// Match dataset loading and normalization.
//
// Reads the combined match CSV (one row per player per game plus one row per
// team per game, marked with position "team"), splits it into typed player
// and team tables, and loads the offline cluster and factor tables.

use crate::config::DataPaths;
use crate::model::{
    kda, ClusterTable, FactorTable, FirstFlags, GameInfo, LaneDiffs, ObjectiveCounts, PlayerRow,
    Position, Side, TeamRow,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Upper bound on the number of factor dimensions in the factor table.
pub const MAX_FACTORS: usize = 8;

/// Column groups the match CSV must contain. Any name within a group
/// satisfies it.
const REQUIRED_COLUMNS: &[&[&str]] = &[
    &["gameid"],
    &["teamname"],
    &["result"],
    &["position", "Position"],
    &["playername", "playerid", "participantid"],
    &["kills", "Kills"],
    &["deaths", "Deaths"],
    &["assists", "Assists"],
];

/// Cell values treated as missing in addition to the empty string.
const NA_VALUES: &[&str] = &["NA", "N/A", "nan", "NaN"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The player and team tables split out of one match CSV.
#[derive(Debug, Clone, Default)]
pub struct MatchTables {
    pub players: Vec<PlayerRow>,
    pub teams: Vec<TeamRow>,
}

/// Everything the dashboard reads, loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub players: Vec<PlayerRow>,
    pub teams: Vec<TeamRow>,
    pub clusters: ClusterTable,
    pub factors: FactorTable,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataFormatError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} is missing a required column (expected one of: {candidates})")]
    MissingColumn { path: String, candidates: String },

    #[error("{path} contains no {what} rows")]
    Empty { path: String, what: &'static str },

    #[error("{path}: {count} player rows have no team row in the same game (first: {example})")]
    OrphanPlayerRows {
        path: String,
        count: usize,
        example: String,
    },

    #[error("{path} has {count} factor columns, at most {MAX_FACTORS} are supported")]
    TooManyFactors { path: String, count: usize },
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// One raw line of the match CSV. Every column is optional at this level;
/// presence of the required ones is checked against the header first.
/// Unparseable numeric cells become `None` via `csv::invalid_option`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMatchRow {
    gameid: Option<String>,
    date: Option<String>,
    league: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    year: Option<f64>,
    split: Option<String>,
    playoffs: Option<String>,
    patch: Option<String>,
    side: Option<String>,
    #[serde(alias = "Position")]
    position: Option<String>,
    playername: Option<String>,
    playerid: Option<String>,
    participantid: Option<String>,
    teamname: Option<String>,
    champion: Option<String>,
    ban1: Option<String>,
    ban2: Option<String>,
    ban3: Option<String>,
    ban4: Option<String>,
    ban5: Option<String>,
    pick1: Option<String>,
    pick2: Option<String>,
    pick3: Option<String>,
    pick4: Option<String>,
    pick5: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    gamelength: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    result: Option<f64>,
    #[serde(alias = "Kills", deserialize_with = "csv::invalid_option")]
    kills: Option<f64>,
    #[serde(alias = "Deaths", deserialize_with = "csv::invalid_option")]
    deaths: Option<f64>,
    #[serde(alias = "Assists", deserialize_with = "csv::invalid_option")]
    assists: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    dpm: Option<f64>,
    #[serde(rename = "earned gpm", alias = "earnedgpm", deserialize_with = "csv::invalid_option")]
    earned_gpm: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    vspm: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    cspm: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    visionscore: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    towers: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    inhibitors: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    dragons: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    barons: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    void_grubs: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    atakhans: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    firstblood: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    firsttower: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    firstdragon: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    firstbaron: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    firstherald: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    golddiffat10: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    golddiffat15: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    golddiffat20: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    golddiffat25: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    csdiffat10: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    csdiffat15: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    csdiffat20: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    csdiffat25: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trim a text cell and drop it if it is empty or an NA marker.
fn clean(value: Option<String>) -> Option<String> {
    let v = value?;
    let v = v.trim();
    if v.is_empty() || NA_VALUES.contains(&v) {
        None
    } else {
        Some(v.to_string())
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Counting stats: missing or negative cells count as zero.
fn count(value: Option<f64>) -> u32 {
    finite(value).map_or(0, |v| v.max(0.0).round() as u32)
}

fn flag(value: Option<f64>) -> Option<bool> {
    finite(value).map(|v| v != 0.0)
}

fn parse_flag_text(value: Option<String>) -> Option<bool> {
    match clean(value)?.to_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(true),
        "0" | "0.0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_date(value: Option<String>) -> Option<NaiveDateTime> {
    let v = clean(value)?;
    NaiveDateTime::parse_from_str(&v, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn champion_list(cells: [Option<String>; 5]) -> Vec<String> {
    cells.into_iter().filter_map(clean).collect()
}

/// Fail with `MissingColumn` unless every required column group is present.
fn check_headers(headers: &csv::StringRecord, origin: &str) -> Result<(), DataFormatError> {
    for group in REQUIRED_COLUMNS {
        if !group.iter().any(|name| headers.iter().any(|h| h == *name)) {
            return Err(DataFormatError::MissingColumn {
                path: origin.to_string(),
                candidates: group.join(", "),
            });
        }
    }
    Ok(())
}

fn csv_error(origin: &str) -> impl Fn(csv::Error) -> DataFormatError + '_ {
    move |source| DataFormatError::Csv {
        path: origin.to_string(),
        source,
    }
}

fn open(path: &Path) -> Result<std::fs::File, DataFormatError> {
    std::fs::File::open(path).map_err(|e| DataFormatError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------------

enum SplitRow {
    Player(PlayerRow),
    Team(TeamRow),
}

fn convert(raw: RawMatchRow, line: usize) -> Option<SplitRow> {
    let position = clean(raw.position)?;

    let Some(game_id) = clean(raw.gameid) else {
        warn!("skipping line {line}: missing gameid");
        return None;
    };
    let Some(team) = clean(raw.teamname) else {
        warn!("skipping line {line} of game {game_id}: missing teamname");
        return None;
    };

    let game = GameInfo {
        game_id,
        date: parse_date(raw.date),
        league: clean(raw.league).unwrap_or_default(),
        year: finite(raw.year).map(|y| y.round() as i32),
        split: clean(raw.split),
        playoffs: parse_flag_text(raw.playoffs),
        patch: clean(raw.patch),
        side: clean(raw.side).as_deref().and_then(Side::from_str_side),
        team,
        win: flag(raw.result).unwrap_or(false),
        game_length: finite(raw.gamelength),
        bans: champion_list([raw.ban1, raw.ban2, raw.ban3, raw.ban4, raw.ban5]),
    };

    let diffs = LaneDiffs {
        gold: [
            finite(raw.golddiffat10),
            finite(raw.golddiffat15),
            finite(raw.golddiffat20),
            finite(raw.golddiffat25),
        ],
        cs: [
            finite(raw.csdiffat10),
            finite(raw.csdiffat15),
            finite(raw.csdiffat20),
            finite(raw.csdiffat25),
        ],
    };

    let (kills, deaths, assists) = (count(raw.kills), count(raw.deaths), count(raw.assists));

    if position.eq_ignore_ascii_case("team") {
        return Some(SplitRow::Team(TeamRow {
            game,
            kills,
            deaths,
            assists,
            dpm: finite(raw.dpm),
            earned_gpm: finite(raw.earned_gpm),
            vspm: finite(raw.vspm),
            objectives: ObjectiveCounts {
                towers: finite(raw.towers),
                inhibitors: finite(raw.inhibitors),
                dragons: finite(raw.dragons),
                barons: finite(raw.barons),
                void_grubs: finite(raw.void_grubs),
                atakhans: finite(raw.atakhans),
            },
            firsts: FirstFlags {
                blood: flag(raw.firstblood),
                tower: flag(raw.firsttower),
                dragon: flag(raw.firstdragon),
                baron: flag(raw.firstbaron),
                herald: flag(raw.firstherald),
            },
            picks: champion_list([raw.pick1, raw.pick2, raw.pick3, raw.pick4, raw.pick5]),
            diffs,
        }));
    }

    let player_id = clean(raw.playerid);
    let Some(player) = clean(raw.playername)
        .or_else(|| player_id.clone())
        .or_else(|| clean(raw.participantid))
    else {
        // No identifier at all.
        return None;
    };
    let Some(pos) = Position::from_str_pos(&position) else {
        warn!("skipping line {line} ({player}): unknown position '{position}'");
        return None;
    };

    Some(SplitRow::Player(PlayerRow {
        game,
        player,
        player_id,
        position: pos,
        champion: clean(raw.champion),
        kills,
        deaths,
        assists,
        kda: kda(kills, deaths, assists),
        dpm: finite(raw.dpm),
        earned_gpm: finite(raw.earned_gpm),
        vspm: finite(raw.vspm),
        cspm: finite(raw.cspm),
        vision_score: finite(raw.visionscore),
        diffs,
    }))
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

/// Parse a match CSV into player and team tables. `origin` names the source
/// in error messages.
pub fn load_matches_from_reader<R: Read>(
    rdr: R,
    origin: &str,
) -> Result<MatchTables, DataFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(rdr);

    let headers = reader.headers().map_err(csv_error(origin))?.clone();
    check_headers(&headers, origin)?;

    let mut tables = MatchTables::default();
    for (idx, result) in reader.deserialize::<RawMatchRow>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        match result {
            Ok(raw) => match convert(raw, line) {
                Some(SplitRow::Player(p)) => tables.players.push(p),
                Some(SplitRow::Team(t)) => tables.teams.push(t),
                None => {}
            },
            Err(e) => {
                warn!("skipping malformed match row at line {line}: {e}");
            }
        }
    }

    if tables.players.is_empty() {
        return Err(DataFormatError::Empty {
            path: origin.to_string(),
            what: "player-level",
        });
    }
    if tables.teams.is_empty() {
        return Err(DataFormatError::Empty {
            path: origin.to_string(),
            what: "team-level",
        });
    }

    check_team_coverage(&tables, origin)?;
    Ok(tables)
}

/// Every player row must have a team row for the same game and team.
fn check_team_coverage(tables: &MatchTables, origin: &str) -> Result<(), DataFormatError> {
    let known: HashSet<(&str, &str)> = tables
        .teams
        .iter()
        .map(|t| (t.game.game_id.as_str(), t.game.team.as_str()))
        .collect();

    let orphans: Vec<&PlayerRow> = tables
        .players
        .iter()
        .filter(|p| !known.contains(&(p.game.game_id.as_str(), p.game.team.as_str())))
        .collect();

    match orphans.first() {
        None => Ok(()),
        Some(first) => Err(DataFormatError::OrphanPlayerRows {
            path: origin.to_string(),
            count: orphans.len(),
            example: format!("{} / {} in {}", first.player, first.game.team, first.game.game_id),
        }),
    }
}

/// Parse a cluster CSV: identifier in the first column, label in the second.
/// Labels may be bare integers or text such as "Factor 3"; the first run of
/// digits is taken.
pub fn load_clusters_from_reader<R: Read>(
    rdr: R,
    origin: &str,
) -> Result<ClusterTable, DataFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(rdr);

    let mut table = ClusterTable::default();
    for result in reader.records() {
        let record = result.map_err(csv_error(origin))?;
        let (Some(id), Some(label)) = (record.get(0), record.get(1)) else {
            warn!("skipping short cluster row in {origin}");
            continue;
        };
        if id.is_empty() {
            continue;
        }
        match extract_label(label) {
            Some(cluster) => {
                table.labels.insert(id.to_string(), cluster);
            }
            None => warn!("skipping cluster row for '{id}': no numeric label in '{label}'"),
        }
    }
    Ok(table)
}

fn extract_label(label: &str) -> Option<u32> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Parse a factor-score CSV: a player identifier column (`playername`,
/// `player` or `id`) and up to [`MAX_FACTORS`] numeric factor columns whose
/// headers are the factor names.
pub fn load_factors_from_reader<R: Read>(
    rdr: R,
    origin: &str,
) -> Result<FactorTable, DataFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers = reader.headers().map_err(csv_error(origin))?.clone();
    let id_idx = ["playername", "player", "id"]
        .iter()
        .find_map(|c| headers.iter().position(|h| h.eq_ignore_ascii_case(c)))
        .ok_or_else(|| DataFormatError::MissingColumn {
            path: origin.to_string(),
            candidates: "playername, player, id".into(),
        })?;

    let factor_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != id_idx && !h.to_lowercase().starts_with("unnamed"))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    if factor_cols.len() > MAX_FACTORS {
        return Err(DataFormatError::TooManyFactors {
            path: origin.to_string(),
            count: factor_cols.len(),
        });
    }

    let mut table = FactorTable {
        names: factor_cols.iter().map(|(_, name)| name.clone()).collect(),
        ..Default::default()
    };

    for result in reader.records() {
        let record = result.map_err(csv_error(origin))?;
        let Some(player) = record.get(id_idx).filter(|p| !p.is_empty()) else {
            continue;
        };
        let values = factor_cols
            .iter()
            .map(|(i, _)| {
                record
                    .get(*i)
                    .and_then(|cell| cell.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
            })
            .collect();
        if table.scores.insert(player.to_string(), values).is_some() {
            warn!("duplicate factor row for '{player}', using latest values");
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load and split the match CSV at `path`.
pub fn load_matches(path: &Path) -> Result<MatchTables, DataFormatError> {
    load_matches_from_reader(open(path)?, &path.display().to_string())
}

pub fn load_clusters(path: &Path) -> Result<ClusterTable, DataFormatError> {
    load_clusters_from_reader(open(path)?, &path.display().to_string())
}

pub fn load_factors(path: &Path) -> Result<FactorTable, DataFormatError> {
    load_factors_from_reader(open(path)?, &path.display().to_string())
}

/// Load every table named in `paths`, resolving relative paths against
/// `base_dir`. Cluster and factor files are optional.
pub fn load_dataset(paths: &DataPaths, base_dir: &Path) -> Result<Arc<Dataset>, DataFormatError> {
    let matches = load_matches(&base_dir.join(&paths.matches))?;
    info!(
        "Loaded {} player rows and {} team rows",
        matches.players.len(),
        matches.teams.len()
    );

    let clusters = match &paths.clusters {
        Some(p) => load_clusters(&base_dir.join(p))?,
        None => ClusterTable::default(),
    };
    let factors = match &paths.factors {
        Some(p) => load_factors(&base_dir.join(p))?,
        None => FactorTable::default(),
    };
    info!(
        "Loaded {} cluster assignments and factor scores for {} players",
        clusters.len(),
        factors.len()
    );

    Ok(Arc::new(Dataset {
        players: matches.players,
        teams: matches.teams,
        clusters,
        factors,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    #[test]
    fn sample_splits_into_player_and_team_tables() {
        let tables = testdata::tables();
        assert_eq!(tables.players.len(), 12);
        assert_eq!(tables.teams.len(), 6);

        let faker = &tables.players[0];
        assert_eq!(faker.player, "Faker");
        assert_eq!(faker.position, Position::Mid);
        assert_eq!(faker.champion.as_deref(), Some("Orianna"));
        assert_eq!(faker.game.year, Some(2023));
        assert_eq!(faker.game.split.as_deref(), Some("Spring"));
        assert_eq!(faker.game.playoffs, Some(false));
        assert_eq!(faker.game.patch.as_deref(), Some("13.01"));
        assert_eq!(faker.game.side, Some(Side::Blue));
        assert!(faker.game.win);
        assert_eq!(faker.game.bans, vec!["Zeri", "Yuumi", "Kalista"]);
        assert!((faker.kda - 12.0).abs() < f64::EPSILON);
        assert_eq!(faker.earned_gpm, Some(400.0));
        assert_eq!(faker.diffs.gold[0], Some(300.0));
        assert_eq!(faker.diffs.gold[2], None);

        let t1 = &tables.teams[0];
        assert_eq!(t1.game.team, "T1");
        assert_eq!(t1.picks, vec!["Orianna", "Aphelios"]);
        assert_eq!(t1.kills, 13);
        assert_eq!(t1.objectives.dragons, Some(3.0));
        assert_eq!(t1.firsts.blood, Some(true));
        assert_eq!(t1.firsts.herald, None);
    }

    #[test]
    fn missing_required_column_is_a_format_error() {
        let csv_data = "\
gameid,teamname,result,position,playername,kills,assists
G1,T1,1,mid,Faker,5,7";

        let err = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap_err();
        match err {
            DataFormatError::MissingColumn { candidates, .. } => {
                assert!(candidates.contains("deaths"));
            }
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    #[test]
    fn capitalized_column_aliases_are_accepted() {
        let csv_data = "\
gameid,teamname,result,Position,playername,Kills,Deaths,Assists
G1,T1,1,mid,Faker,5,0,7
G1,T1,1,team,,13,3,11";

        let tables = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap();
        assert_eq!(tables.players[0].kills, 5);
        assert!((tables.players[0].kda - 12.0).abs() < f64::EPSILON);
        assert_eq!(tables.teams[0].assists, 11);
    }

    #[test]
    fn na_markers_and_garbage_become_missing() {
        let csv_data = "\
gameid,teamname,result,position,playername,kills,deaths,assists,dpm,year,patch
G1,T1,1,mid,Faker,NA,2,4,N/A,2023,NA
G1,T1,1,team,,13,3,11,oops,2023,13.01";

        let tables = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap();
        let faker = &tables.players[0];
        assert_eq!(faker.kills, 0);
        assert_eq!(faker.dpm, None);
        assert_eq!(faker.game.patch, None);
        assert_eq!(tables.teams[0].dpm, None);
        assert_eq!(tables.teams[0].game.patch.as_deref(), Some("13.01"));
    }

    #[test]
    fn unnamed_index_column_is_ignored() {
        let csv_data = "\
Unnamed: 0,gameid,teamname,result,position,playername,kills,deaths,assists
0,G1,T1,1,mid,Faker,5,1,7
1,G1,T1,1,team,,13,3,11";

        let tables = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap();
        assert_eq!(tables.players.len(), 1);
    }

    #[test]
    fn rows_without_position_or_player_are_dropped() {
        let csv_data = "\
gameid,teamname,result,position,playername,kills,deaths,assists
G1,T1,1,mid,Faker,5,1,7
G1,T1,1,,Ghost,1,1,1
G1,T1,1,bot,,8,2,4
G1,T1,1,coach,Kkoma,0,0,0
G1,T1,1,team,,13,3,11";

        let tables = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap();
        assert_eq!(tables.players.len(), 1);
        assert_eq!(tables.players[0].player, "Faker");
        assert_eq!(tables.teams.len(), 1);
    }

    #[test]
    fn player_id_used_when_name_is_missing() {
        let csv_data = "\
gameid,teamname,result,position,playername,playerid,kills,deaths,assists
G1,T1,1,mid,,oe:player:1,5,1,7
G1,T1,1,team,,,13,3,11";

        let tables = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap();
        assert_eq!(tables.players[0].player, "oe:player:1");
    }

    #[test]
    fn no_team_rows_is_a_format_error() {
        let csv_data = "\
gameid,teamname,result,position,playername,kills,deaths,assists
G1,T1,1,mid,Faker,5,1,7";

        let err = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(
            err,
            DataFormatError::Empty {
                what: "team-level",
                ..
            }
        ));
    }

    #[test]
    fn player_row_without_team_row_is_a_format_error() {
        let csv_data = "\
gameid,teamname,result,position,playername,kills,deaths,assists
G1,T1,1,mid,Faker,5,1,7
G1,GEN,0,mid,Chovy,1,5,1
G1,T1,1,team,,13,3,11";

        let err = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap_err();
        match err {
            DataFormatError::OrphanPlayerRows { count, example, .. } => {
                assert_eq!(count, 1);
                assert!(example.contains("Chovy"));
            }
            other => panic!("expected OrphanPlayerRows, got: {other}"),
        }
    }

    #[test]
    fn truncated_trailing_row_is_ignored() {
        let csv_data = "\
gameid,teamname,result,position,playername,kills,deaths,assists
G1,T1,1,mid,Faker,5,1,7
G1,T1,1,team,,13,3,11
G1,\"unterminated";

        let tables = load_matches_from_reader(csv_data.as_bytes(), "inline").unwrap();
        assert_eq!(tables.players.len(), 1);
        assert_eq!(tables.teams.len(), 1);
    }

    #[test]
    fn cluster_labels_extract_the_integer() {
        let clusters = testdata::clusters();
        assert_eq!(clusters.get("Faker"), Some(2));
        assert_eq!(clusters.get("Zeka"), Some(3));
        assert_eq!(clusters.get("Viper"), Some(1));
        assert_eq!(clusters.get("Peyz"), None);
    }

    #[test]
    fn factor_table_keeps_header_names_and_blank_cells() {
        let factors = testdata::factors();
        assert_eq!(factors.names.len(), 4);
        assert_eq!(factors.names[0], "Resource & Vision");
        assert_eq!(factors.scores["Chovy"][2], None);
        assert_eq!(factors.scores["Faker"][3], Some(64.2));
    }

    #[test]
    fn factor_table_rejects_more_than_eight_factors() {
        let csv_data = "\
playername,f1,f2,f3,f4,f5,f6,f7,f8,f9
Faker,1,2,3,4,5,6,7,8,9";

        let err = load_factors_from_reader(csv_data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, DataFormatError::TooManyFactors { count: 9, .. }));
    }

    #[test]
    fn factor_table_requires_an_identifier_column() {
        let csv_data = "\
name,f1
Faker,1";

        let err = load_factors_from_reader(csv_data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, DataFormatError::MissingColumn { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_matches(Path::new("/nonexistent/lck.csv")).unwrap_err();
        assert!(matches!(err, DataFormatError::Io { .. }));
    }
}
