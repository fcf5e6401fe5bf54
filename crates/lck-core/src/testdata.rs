// Shared fixtures for unit tests.

use crate::loader::{
    load_clusters_from_reader, load_factors_from_reader, load_matches_from_reader, Dataset,
    MatchTables,
};
use crate::model::{ClusterTable, FactorTable};

pub const MATCHES_CSV: &str = include_str!("../tests/fixtures/lck_sample.csv");
pub const CLUSTERS_CSV: &str = include_str!("../tests/fixtures/clusters.csv");
pub const FACTORS_CSV: &str = include_str!("../tests/fixtures/factors.csv");

pub fn tables() -> MatchTables {
    load_matches_from_reader(MATCHES_CSV.as_bytes(), "lck_sample.csv").unwrap()
}

pub fn clusters() -> ClusterTable {
    load_clusters_from_reader(CLUSTERS_CSV.as_bytes(), "clusters.csv").unwrap()
}

pub fn factors() -> FactorTable {
    load_factors_from_reader(FACTORS_CSV.as_bytes(), "factors.csv").unwrap()
}

pub fn dataset() -> Dataset {
    let tables = tables();
    Dataset {
        players: tables.players,
        teams: tables.teams,
        clusters: clusters(),
        factors: factors(),
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

pub fn approx_opt(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| approx(a, b))
}
