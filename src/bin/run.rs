//! This is a sample program that times the layout pipeline on synthetic
//! graphs of growing size, for each placement algorithm and routing mode.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{Arg, Command};
use glayout::core::config::{Algorithm, EdgeRoutingMode, LayoutConfig};
use glayout::topo::layout;
use glayout::topo::synthetic;
use std::time::Instant;

const ALGORITHMS: [Algorithm; 2] = [Algorithm::Layered, Algorithm::Mds];
const ROUTING: [EdgeRoutingMode; 3] = [
    EdgeRoutingMode::StraightLine,
    EdgeRoutingMode::Spline,
    EdgeRoutingMode::Rectilinear,
];

fn main() {
    let matches = Command::new("run")
        .version("0.1")
        .about("Times the layout of synthetic graphs")
        .arg(
            Arg::new("GRAPH")
                .help("The kind of graph: chain, tree, grid, cycle or clustered")
                .default_value("grid")
                .index(1),
        )
        .arg(
            Arg::new("max")
                .short('m')
                .long("max")
                .value_name("N")
                .help("The largest number of nodes")
                .value_parser(clap::value_parser!(usize))
                .default_value("128"),
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let kind = matches
        .get_one::<String>("GRAPH")
        .cloned()
        .unwrap_or_else(|| String::from("grid"));
    let max = matches.get_one::<usize>("max").copied().unwrap_or(128);

    let mut n = 4;
    while n <= max {
        let Some(graph) = synthetic::generate(&kind, n) else {
            log::error!("Unknown graph kind '{}'", kind);
            std::process::exit(1);
        };
        for algorithm in ALGORITHMS {
            for edge_routing in ROUTING {
                let config = LayoutConfig {
                    algorithm,
                    edge_routing,
                    ..Default::default()
                };
                let start = Instant::now();
                match layout(&graph, &config) {
                    Ok(res) => println!(
                        "{:>10} {:>5} nodes {:?}/{:?}: {:>8.2} ms, {:.0} x {:.0}",
                        kind,
                        graph.num_nodes(),
                        algorithm,
                        edge_routing,
                        start.elapsed().as_secs_f64() * 1000.,
                        res.bbox.width(),
                        res.bbox.height()
                    ),
                    Err(err) => log::error!("Layout failed: {}", err),
                }
            }
        }
        n *= 2;
    }
}
