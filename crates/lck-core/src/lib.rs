// Library root: the loader, filter, aggregation, and presentation layers
// behind the LCK analytics dashboard.

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pages;
pub mod present;

#[cfg(test)]
mod testdata;
