use crate::cli::run;

pub mod cli;
pub mod config;
pub mod domain;
pub mod fields;
pub mod host;
pub mod http;
pub mod resolver;
pub mod storage;

fn main() -> anyhow::Result<()> {
    run()
}
