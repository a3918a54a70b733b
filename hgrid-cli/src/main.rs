//! `hgrid`: build a weighted grid, decompose it once and answer distance
//! queries through the separator hierarchy.
//!
//! ```text
//! hgrid --width 32 --height 32 --seed 7 query 0,0 31,31 --verify --path
//! hgrid --db distances.redb query 3,4 20,9
//! hgrid --db distances.redb dump
//! hgrid --width 12 --height 8 show
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hgrid_core::{GridGraph, Point};
use hgrid_hier::{
    Decomposer, DistanceCache, DistanceStore, Hierarchy, HierarchyConfig, PathFinder,
    PrecomputationEngine, RedbStore, SeparatorSink,
};
use hgrid_paths::{PathRange, UNREACHABLE};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hgrid", version, about, long_about = None)]
struct Cli {
    /// Grid width.
    #[arg(long, default_value_t = 16, global = true)]
    width: i32,

    /// Grid height.
    #[arg(long, default_value_t = 16, global = true)]
    height: i32,

    /// Seed for edge weights (and for sampling, unless the config sets one).
    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Give every edge this weight instead of random weights in 1..=2.
    #[arg(long, global = true)]
    uniform: Option<i32>,

    /// Load the graph from a JSON file instead of generating it.
    #[arg(long, global = true, conflicts_with = "uniform")]
    graph: Option<PathBuf>,

    /// Durable distance store (redb file, created if missing). Distances
    /// left by a different graph are dropped.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Precomputation workers (overrides the config file).
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// JSON file with hierarchy settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(short, long, default_value = "info", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Shortest distance between two cells, written `x,y`.
    Query {
        #[arg(value_parser = parse_point)]
        from: Point,
        #[arg(value_parser = parse_point)]
        to: Point,
        /// Also run a plain Dijkstra and fail on a mismatch.
        #[arg(long)]
        verify: bool,
        /// Print every cell of the route.
        #[arg(long)]
        path: bool,
    },
    /// List the records of the durable store given with `--db`.
    Dump,
    /// Draw the grid with its separator vertices.
    Show {
        /// Also write the graph as JSON, for later `--graph` runs.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok(Point::new(x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.verbosity));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Command::Dump = cli.command {
        let db = cli.db.as_deref().context("dump needs --db")?;
        return dump(db);
    }

    let config = load_config(&cli)?;
    let graph = load_graph(&cli)?;
    log::info!("graph {}x{}, {} vertices", graph.size().x, graph.size().y, graph.len());

    let store = cli
        .db
        .as_deref()
        .map(|db| RedbStore::open_for(db, &graph))
        .transpose()
        .context("opening the distance store")?;
    let outcome = run(&cli.command, &graph, &config, store.as_ref());
    if let Some(store) = store {
        store.close();
    }
    outcome
}

fn run(
    command: &Command,
    graph: &GridGraph,
    config: &HierarchyConfig,
    store: Option<&RedbStore>,
) -> Result<()> {
    let cache = match store {
        Some(store) => DistanceCache::with_store(store),
        None => DistanceCache::in_memory(),
    };

    match *command {
        Command::Query {
            from,
            to,
            verify,
            path,
        } => {
            for p in [from, to] {
                if !graph.contains(p) {
                    bail!("{p} is outside the {}x{} grid", graph.size().x, graph.size().y);
                }
            }
            let hierarchy = decompose(graph, &cache, config, None)?;
            let finder = PathFinder::new(graph, &hierarchy, &cache)
                .with_memoization(config.memoize_queries);
            let route = finder.route(from, to);
            if !route.is_reachable() {
                println!("{to} is unreachable from {from}");
            } else {
                println!("distance {from} -> {to}: {}", route.distance);
            }

            if path {
                if let Some(cells) = finder.expand(&route) {
                    let cells: Vec<String> = cells.iter().map(Point::to_string).collect();
                    println!("path: {}", cells.join(" "));
                }
            }
            if verify {
                let expected = PathRange::new(graph.bounds()).dijkstra_distance(graph, from, to);
                if expected != route.distance {
                    bail!(
                        "hierarchical distance {} differs from Dijkstra {}",
                        fmt_distance(route.distance),
                        fmt_distance(expected)
                    );
                }
                println!("verified against Dijkstra");
            }
        }
        Command::Show { ref save } => {
            let marks = Marks::default();
            let hierarchy = decompose(graph, &cache, config, Some(&marks))?;
            print!("{}", render(graph, &marks.0.into_inner()));
            for level in hierarchy.levels() {
                let count = hierarchy.separators(level).map_or(0, BTreeSet::len);
                println!("level {level}: {count} separator vertices");
            }
            if let Some(path) = save {
                let json = serde_json::to_string(graph)?;
                fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            }
        }
        Command::Dump => unreachable!("handled before the graph is built"),
    }

    let stats = cache.stats();
    log::info!(
        "cache: {} entries, {} memory hits, {} store hits, {} misses{}",
        cache.len(),
        stats.memory_hits,
        stats.store_hits,
        stats.misses,
        if cache.is_degraded() { " (store degraded)" } else { "" }
    );
    Ok(())
}

fn decompose(
    graph: &GridGraph,
    cache: &DistanceCache<'_>,
    config: &HierarchyConfig,
    sink: Option<&dyn SeparatorSink>,
) -> Result<Hierarchy> {
    let engine = PrecomputationEngine::new(graph, cache, config);
    let mut decomposer = Decomposer::new(graph);
    if let Some(sink) = sink {
        decomposer = decomposer.with_sink(sink);
    }
    decomposer
        .decompose_grid(&engine)
        .context("decomposing the grid")
}

fn load_config(cli: &Cli) -> Result<HierarchyConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => HierarchyConfig {
            seed: cli.seed,
            ..Default::default()
        },
    };
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.validate()?;
    Ok(config)
}

fn load_graph(cli: &Cli) -> Result<GridGraph> {
    if let Some(path) = &cli.graph {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()));
    }
    if cli.width < 0 || cli.height < 0 {
        bail!("grid size {}x{} is negative", cli.width, cli.height);
    }
    Ok(match cli.uniform {
        Some(w) if w <= 0 => bail!("edge weights must be positive, got {w}"),
        Some(w) => GridGraph::uniform(cli.width, cli.height, w),
        None => GridGraph::random(cli.width, cli.height, &mut StdRng::seed_from_u64(cli.seed)),
    })
}

fn dump(db: &Path) -> Result<()> {
    let store = RedbStore::open(db).with_context(|| format!("opening {}", db.display()))?;
    let records = store.records();
    store.close();
    let records = records.context("reading stored distances")?;
    for (key, distance) in &records {
        println!("{key}\t{}", fmt_distance(*distance));
    }
    log::info!("{} records", records.len());
    Ok(())
}

fn fmt_distance(d: i32) -> String {
    if d == UNREACHABLE { "unreachable".into() } else { d.to_string() }
}

#[derive(Default)]
struct Marks(Mutex<BTreeSet<Point>>);

impl SeparatorSink for Marks {
    fn mark_separator(&self, p: Point) {
        self.0.lock().insert(p);
    }
}

/// `#` walls, `+` separator vertices, `.` everything else.
fn render(graph: &GridGraph, marks: &BTreeSet<Point>) -> String {
    let size = graph.size();
    let mut out = String::with_capacity(((size.x + 1) * size.y).max(0) as usize);
    for y in 0..size.y {
        for x in 0..size.x {
            let p = Point::new(x, y);
            out.push(if graph.is_wall(p) {
                '#'
            } else if marks.contains(&p) {
                '+'
            } else {
                '.'
            });
        }
        out.push('\n');
    }
    out
}
