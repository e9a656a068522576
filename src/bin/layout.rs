//! This is the command line tool that builds a synthetic graph, lays it out
//! and saves (or prints) the resulting geometry.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{Arg, ArgAction, Command};
use glayout::core::config::LayoutConfig;
use glayout::core::utils::save_to_file;
use glayout::topo::layout;
use glayout::topo::synthetic;
use std::fs;

struct CLIOptions {
    kind: String,
    size: usize,
    config_path: Option<String>,
    options: Vec<(String, String)>,
    output_path: Option<String>,
}

impl CLIOptions {
    pub fn new() -> Self {
        Self {
            kind: String::from("tree"),
            size: 10,
            config_path: None,
            options: Vec::new(),
            output_path: None,
        }
    }
}

/// Build the layout configuration from the config file, and then apply the
/// `key=value` options on top of it.
fn load_config(options: &CLIOptions) -> Result<LayoutConfig, String> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Some(path) = &options.config_path {
        let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
        let Some(map) = value.as_object() else {
            return Err(format!("{}: expected a JSON object", path));
        };
        for (key, value) in map {
            pairs.push((key.clone(), value.to_string()));
        }
    }
    pairs.extend(options.options.iter().cloned());
    LayoutConfig::from_options(&pairs).map_err(|e| e.to_string())
}

fn run(options: CLIOptions) -> Result<(), String> {
    let config = load_config(&options)?;
    let Some(graph) = synthetic::generate(&options.kind, options.size) else {
        return Err(format!(
            "Unknown graph kind '{}', expected one of {:?}",
            options.kind,
            synthetic::KINDS
        ));
    };
    log::info!(
        "Generated a {} graph with {} nodes and {} edges",
        options.kind,
        graph.num_nodes(),
        graph.num_edges()
    );

    let res = layout(&graph, &config).map_err(|e| e.to_string())?;
    let content = res.to_string();
    match &options.output_path {
        Some(path) => save_to_file(path, &content).map_err(|e| format!("{}: {}", path, e))?,
        None => print!("{}", content),
    }
    Ok(())
}

fn main() {
    let matches = Command::new("layout")
        .version("0.1")
        .about("Lays out a synthetic graph and prints the geometry")
        .arg(
            Arg::new("GRAPH")
                .help("The kind of graph: chain, tree, grid, cycle or clustered")
                .default_value("tree")
                .index(1),
        )
        .arg(
            Arg::new("size")
                .short('n')
                .long("size")
                .value_name("N")
                .help("The number of nodes")
                .value_parser(clap::value_parser!(usize))
                .default_value("10"),
        )
        .arg(
            Arg::new("option")
                .short('O')
                .value_name("KEY=VALUE")
                .help("Sets a layout option")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Reads the layout options from a JSON file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path of the output file"),
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let mut cli = CLIOptions::new();
    if let Some(kind) = matches.get_one::<String>("GRAPH") {
        cli.kind = kind.clone();
    }
    if let Some(size) = matches.get_one::<usize>("size") {
        cli.size = *size;
    }
    cli.config_path = matches.get_one::<String>("config").cloned();
    cli.output_path = matches.get_one::<String>("output").cloned();
    if let Some(values) = matches.get_many::<String>("option") {
        for opt in values {
            let Some((key, value)) = opt.split_once('=') else {
                log::error!("Invalid option '{}', expected KEY=VALUE", opt);
                std::process::exit(1);
            };
            cli.options.push((key.to_string(), value.to_string()));
        }
    }

    if let Err(err) = run(cli) {
        log::error!("Error: {}", err);
        std::process::exit(1);
    }
}
