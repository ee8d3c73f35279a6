mod app;
mod error;
mod mock;
mod render;
mod terminal;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};
use treecombo::{Combobox, ComboboxConfig, MemoryProvider};

use app::App;
use error::DemoError;
use terminal::TerminalGuard;

const USAGE: &str = "usage: treecombo-demo [--config <config.json>] [--tree <tree.json>]";

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    tree: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, DemoError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            let slot = match arg.as_str() {
                "--config" => &mut parsed.config,
                "--tree" => &mut parsed.tree,
                other => {
                    return Err(DemoError::Usage(format!(
                        "unknown argument {other}\n{USAGE}"
                    )));
                }
            };
            let value = args
                .next()
                .ok_or_else(|| DemoError::Usage(format!("{arg} needs a path\n{USAGE}")))?;
            *slot = Some(PathBuf::from(value));
        }
        Ok(parsed)
    }
}

fn read(path: &Path) -> Result<String, DemoError> {
    fs::read_to_string(path).map_err(|source| DemoError::Read {
        path: path.to_path_buf(),
        source,
    })
}

async fn run(args: Args) -> Result<(), DemoError> {
    let config = match &args.config {
        Some(path) => ComboboxConfig::from_json(&read(path)?)?,
        None => ComboboxConfig::default(),
    }
    // One terminal line per row.
    .with_item_height(1);

    let provider = match &args.tree {
        Some(path) => MemoryProvider::from_json(&read(path)?)?.with_latency(mock::LATENCY),
        None => mock::provider(),
    };
    info!("Serving {} root nodes", provider.roots().len());

    let combo = Combobox::new(provider, config)?
        .with_on_change(|ids| info!("Selection changed: {} selected", ids.len()));

    let mut terminal = TerminalGuard::new()?;
    App::new(combo).run(&mut terminal).await
}

#[tokio::main]
async fn main() {
    let log_file = File::create("treecombo-demo.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let result = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => run(args).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, DemoError> {
        Args::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn test_parse_paths() {
        let args = parse(&["--tree", "tree.json", "--config", "combo.json"]).unwrap();
        assert_eq!(args.tree, Some(PathBuf::from("tree.json")));
        assert_eq!(args.config, Some(PathBuf::from("combo.json")));
    }

    #[test]
    fn test_parse_rejects_unknown_and_missing() {
        assert!(matches!(parse(&["--verbose"]), Err(DemoError::Usage(_))));
        assert!(matches!(parse(&["--tree"]), Err(DemoError::Usage(_))));
        assert_eq!(parse(&[]).unwrap(), Args::default());
    }
}
