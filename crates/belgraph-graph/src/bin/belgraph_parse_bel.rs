use std::{env, fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use belgraph_dsl::config::ParserConfig;
use belgraph_dsl::resource::DirectoryResources;
use belgraph_graph::parse_bel_document;

/// Parses a BEL document and prints a summary plus every recorded warning.
///
/// Resource URLs are resolved against the document's directory. An optional
/// second argument names a JSON parser config.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: belgraph_parse_bel <file.bel> [config.json]");
    };
    let config = match args.next() {
        Some(config_path) => {
            let text = fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config `{config_path}`"))?;
            ParserConfig::from_json_str(&text)?
        }
        None => ParserConfig::default(),
    };

    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let root = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let resources = DirectoryResources::new(root);

    let document = parse_bel_document(&text, &config, &resources)
        .with_context(|| format!("failed to parse `{}`", path.display()))?;

    for (key, value) in document.metadata.iter() {
        println!("{key}: {value}");
    }
    println!(
        "nodes={} edges={} warnings={}",
        document.graph.node_count(),
        document.graph.edge_count(),
        document.warnings.len()
    );
    for warning in &document.warnings {
        println!("{warning}");
    }
    Ok(())
}
