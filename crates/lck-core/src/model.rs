// Typed rows for the player and team tables, plus the offline-computed
// cluster and factor tables.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Minute marks at which lane gold/CS differences are recorded.
pub const LANE_MINUTES: [u32; 4] = [10, 15, 20, 25];

// ---------------------------------------------------------------------------
// Categorical dimensions
// ---------------------------------------------------------------------------

/// In-game role of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Top,
    Jungle,
    Mid,
    Bot,
    Support,
}

impl Position {
    /// Parse a position string as written in the match CSV.
    ///
    /// Accepts the short dataset codes ("top", "jng", "mid", "bot", "sup")
    /// and their common long forms, case-insensitively.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "top" => Some(Position::Top),
            "jng" | "jungle" | "jgl" => Some(Position::Jungle),
            "mid" | "middle" => Some(Position::Mid),
            "bot" | "adc" | "bottom" => Some(Position::Bot),
            "sup" | "support" | "supp" => Some(Position::Support),
            _ => None,
        }
    }

    /// The dataset code for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Jungle => "jng",
            Position::Mid => "mid",
            Position::Bot => "bot",
            Position::Support => "sup",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Map side a team played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub fn from_str_side(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "blue" => Some(Side::Blue),
            "red" => Some(Side::Red),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Side::Blue => "Blue",
            Side::Red => "Red",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// First-objective flags tracked on team rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FirstObjective {
    Blood,
    Tower,
    Dragon,
    Baron,
    Herald,
}

impl FirstObjective {
    pub const ALL: [FirstObjective; 5] = [
        FirstObjective::Blood,
        FirstObjective::Tower,
        FirstObjective::Dragon,
        FirstObjective::Baron,
        FirstObjective::Herald,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FirstObjective::Blood => "First Blood",
            FirstObjective::Tower => "First Tower",
            FirstObjective::Dragon => "First Dragon",
            FirstObjective::Baron => "First Baron",
            FirstObjective::Herald => "First Herald",
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Key dimensions shared by player and team rows of the same game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameInfo {
    pub game_id: String,
    pub date: Option<NaiveDateTime>,
    pub league: String,
    pub year: Option<i32>,
    pub split: Option<String>,
    pub playoffs: Option<bool>,
    pub patch: Option<String>,
    pub side: Option<Side>,
    pub team: String,
    pub win: bool,
    /// Game length in seconds.
    pub game_length: Option<f64>,
    /// Champions banned by this row's team.
    pub bans: Vec<String>,
}

/// Gold and CS differences against the lane opponent, indexed like
/// [`LANE_MINUTES`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaneDiffs {
    pub gold: [Option<f64>; 4],
    pub cs: [Option<f64>; 4],
}

impl LaneDiffs {
    /// Gold difference at `minute`, if that minute is tracked and recorded.
    pub fn gold_at(&self, minute: u32) -> Option<f64> {
        let idx = LANE_MINUTES.iter().position(|m| *m == minute)?;
        self.gold[idx]
    }

    pub fn cs_at(&self, minute: u32) -> Option<f64> {
        let idx = LANE_MINUTES.iter().position(|m| *m == minute)?;
        self.cs[idx]
    }
}

/// One player in one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow {
    pub game: GameInfo,
    pub player: String,
    pub player_id: Option<String>,
    pub position: Position,
    pub champion: Option<String>,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// `(kills + assists) / max(deaths, 1)`.
    pub kda: f64,
    pub dpm: Option<f64>,
    pub earned_gpm: Option<f64>,
    pub vspm: Option<f64>,
    pub cspm: Option<f64>,
    pub vision_score: Option<f64>,
    pub diffs: LaneDiffs,
}

/// Objective counts for one team in one game.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectiveCounts {
    pub towers: Option<f64>,
    pub inhibitors: Option<f64>,
    pub dragons: Option<f64>,
    pub barons: Option<f64>,
    pub void_grubs: Option<f64>,
    pub atakhans: Option<f64>,
}

/// Which first objectives a team secured. `None` means not recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FirstFlags {
    pub blood: Option<bool>,
    pub tower: Option<bool>,
    pub dragon: Option<bool>,
    pub baron: Option<bool>,
    pub herald: Option<bool>,
}

impl FirstFlags {
    pub fn get(&self, objective: FirstObjective) -> Option<bool> {
        match objective {
            FirstObjective::Blood => self.blood,
            FirstObjective::Tower => self.tower,
            FirstObjective::Dragon => self.dragon,
            FirstObjective::Baron => self.baron,
            FirstObjective::Herald => self.herald,
        }
    }
}

/// One team in one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRow {
    pub game: GameInfo,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub dpm: Option<f64>,
    pub earned_gpm: Option<f64>,
    pub vspm: Option<f64>,
    pub objectives: ObjectiveCounts,
    pub firsts: FirstFlags,
    /// Champions picked by this team.
    pub picks: Vec<String>,
    pub diffs: LaneDiffs,
}

/// KDA with zero deaths counted as one, as the dataset convention does.
pub fn kda(kills: u32, deaths: u32, assists: u32) -> f64 {
    (kills + assists) as f64 / deaths.max(1) as f64
}

// ---------------------------------------------------------------------------
// Offline analysis tables
// ---------------------------------------------------------------------------

/// Identifier → cluster label, produced by offline hierarchical clustering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterTable {
    pub labels: HashMap<String, u32>,
}

impl ClusterTable {
    pub fn get(&self, id: &str) -> Option<u32> {
        self.labels.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Player → named factor scores, produced by offline factor analysis.
///
/// `scores[player][i]` belongs to factor `names[i]`; cells that were blank
/// in the source file are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FactorTable {
    pub names: Vec<String>,
    pub scores: HashMap<String, Vec<Option<f64>>>,
}

impl FactorTable {
    /// Named scores for one player, skipping blank cells. `None` if the
    /// player is not in the table.
    pub fn scores_for(&self, player: &str) -> Option<Vec<(String, f64)>> {
        let values = self.scores.get(player)?;
        Some(
            self.names
                .iter()
                .zip(values)
                .filter_map(|(name, v)| v.map(|v| (name.clone(), v)))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
