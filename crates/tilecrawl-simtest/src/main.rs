//! Tilecrawl Headless Generation Harness
//!
//! Builds levels from the tile catalog and validates them.
//! Runs entirely in-process, with no rendering or input devices.
//!
//! Usage:
//!   cargo run -p tilecrawl-simtest
//!   cargo run -p tilecrawl-simtest -- --runs 50 --branches 6 --verbose

use clap::Parser;
use log::LevelFilter;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Instant;
use tilecrawl_core::prelude::*;
use tilecrawl_logic::geometry::COLLISION_TOLERANCE;
use tilecrawl_logic::validation::{validate_level, Severity};

/// Headless dungeon generation harness
#[derive(Parser, Debug)]
#[command(name = "tilecrawl-simtest")]
#[command(version, about = "Generate and validate tilecrawl levels", long_about = None)]
struct Args {
    /// First seed; run `n` uses `seed + n`
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Levels to generate
    #[arg(long, default_value_t = 20)]
    runs: u32,

    /// Main path length, start and exit included
    #[arg(long, default_value_t = 10)]
    main_length: u32,

    /// Tiles per branch, counting the tile it grows from
    #[arg(long, default_value_t = 5)]
    branch_length: u32,

    /// Number of branches
    #[arg(long, default_value_t = 10)]
    branches: u32,

    /// Door chance per link (0-100)
    #[arg(long, default_value_t = 25)]
    door_percent: u32,

    /// Seconds between generation steps
    #[arg(long, default_value_t = 0.0)]
    delay: f32,

    /// Consecutive rejections before backtracking
    #[arg(long, default_value_t = 50)]
    max_attempts: u32,

    /// Tile catalog JSON (defaults to the built-in tileset)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Reload each level this many times through the session
    #[arg(long, default_value_t = 1)]
    reloads: u32,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

// ── Logging ─────────────────────────────────────────────────────────────

fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Route `log` output to stderr so it stays out of the ✓/✗ report.
fn install_logger(verbose: bool) {
    use simplelog::LevelFilter::Off;
    let config = simplelog::ConfigBuilder::new()
        .set_target_level(Off)
        .set_location_level(Off)
        .build();
    if let Err(e) = simplelog::TermLogger::init(
        log_level(verbose),
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("logger already installed: {}", e);
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args = Args::parse();
    install_logger(args.verbose);
    println!("=== Tilecrawl Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog and configuration
    let setup = load_setup(&args, &mut results);

    if let Some((config, catalog)) = setup {
        // 2. Seed sweep
        results.extend(validate_seed_sweep(&args, &config, &catalog));

        // 3. Determinism
        results.extend(validate_determinism(&args, &config, &catalog));

        // 4. Session commands
        results.extend(validate_session(&args, &config, &catalog));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn generator(
    config: &GeneratorConfig,
    catalog: &TileCatalog,
    seed: u64,
) -> Result<DungeonGenerator<ChaCha8Rng>, GenerationError> {
    DungeonGenerator::new(
        config.clone(),
        catalog.clone(),
        ChaCha8Rng::seed_from_u64(seed),
        GridIndex::default(),
    )
}

fn failure(name: &str, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail,
    }
}

// ── 1. Setup ────────────────────────────────────────────────────────────

fn load_setup(args: &Args, results: &mut Vec<TestResult>) -> Option<(GeneratorConfig, TileCatalog)> {
    println!("--- Catalog & Config ---");

    let catalog = match &args.catalog {
        Some(path) => TileCatalog::load(path),
        None => TileCatalog::builtin(),
    };
    let catalog = match catalog {
        Ok(c) => c,
        Err(e) => {
            results.push(failure("catalog_load", format!("{}", e)));
            return None;
        }
    };
    results.push(TestResult {
        name: "catalog_load".into(),
        passed: true,
        detail: format!(
            "{} start, {} regular, {} exit, {} blocker, {} door prefabs",
            catalog.start.len(),
            catalog.regular.len(),
            catalog.exit.len(),
            catalog.blocker.len(),
            catalog.door.len()
        ),
    });

    let config = GeneratorConfig {
        main_length: args.main_length,
        branch_length: args.branch_length,
        num_branches: args.branches,
        door_percent: args.door_percent,
        construction_delay: args.delay,
        max_attempts: args.max_attempts,
        ..GeneratorConfig::default()
    };
    if let Err(e) = config.validate() {
        results.push(failure("config_valid", format!("{}", e)));
        return None;
    }
    if let Err(e) = catalog.validate(config.door_percent > 0) {
        results.push(failure("catalog_valid", format!("{}", e)));
        return None;
    }
    results.push(TestResult {
        name: "config_valid".into(),
        passed: true,
        detail: format!(
            "main {}, {} branches of {}, {}% doors",
            config.main_length, config.num_branches, config.branch_length, config.door_percent
        ),
    });
    Some((config, catalog))
}

// ── 2. Seed sweep ───────────────────────────────────────────────────────

fn validate_seed_sweep(args: &Args, config: &GeneratorConfig, catalog: &TileCatalog) -> Vec<TestResult> {
    println!("--- Seed Sweep ({} runs) ---", args.runs);
    let mut results = Vec::new();
    let started = Instant::now();
    let mut invalid = 0;
    let mut short = 0;
    let mut total_tiles = 0;

    let mut levels = 0u32;

    for run in 0..args.runs {
        let seed = args.seed.wrapping_add(u64::from(run));
        let mut session = match generator(config, catalog, seed) {
            Ok(g) => Session::new(g),
            Err(e) => {
                results.push(failure("sweep_setup", format!("seed {}: {}", seed, e)));
                return results;
            }
        };

        // The first build plus one rebuild per reload.
        for pass in 0..=args.reloads {
            if pass > 0 {
                session.handle(Command::ReloadLevel);
            }
            levels += 1;
            if let Err(e) = session.run(std::thread::sleep) {
                results.push(failure("sweep_generate", format!("seed {}: {}", seed, e)));
                invalid += 1;
                continue;
            }
            session.handle(Command::ToggleOverview);

            let level = session.generator();
            if level.frontier_exhausted(Container::Main) {
                short += 1;
            }
            total_tiles += level.generated_tiles().len();

            if let Err(detail) = check_level(level) {
                invalid += 1;
                results.push(failure(
                    "sweep_level_valid",
                    format!("seed {} pass {}: {}", seed, pass, detail),
                ));
            }
            if args.verbose {
                println!(
                    "  seed {} pass {}: {} tiles, {} blockers, {} doors",
                    seed,
                    pass,
                    level.generated_tiles().len(),
                    level.fixture_count(FixtureKind::Blocker),
                    level.fixture_count(FixtureKind::Door)
                );
            }
        }
    }

    results.push(TestResult {
        name: "sweep_all_valid".into(),
        passed: invalid == 0,
        detail: format!(
            "{}/{} levels valid, avg {:.1} tiles, {} main paths ended short, {:.1?}",
            levels - invalid,
            levels,
            total_tiles as f64 / f64::from(levels.max(1)),
            short,
            started.elapsed()
        ),
    });
    results
}

/// Run level validation, keeping only hard errors.
fn check_level(level: &DungeonGenerator<ChaCha8Rng>) -> Result<(), String> {
    let tiles = level.footprints().map_err(|e| e.to_string())?;
    let sockets = level.sockets().map_err(|e| e.to_string())?;
    let errors: Vec<_> = validate_level(&tiles, &sockets, COLLISION_TOLERANCE)
        .into_iter()
        .filter(|e| e.severity == Severity::Error)
        .collect();
    match errors.first() {
        None => Ok(()),
        Some(first) => Err(format!(
            "{} errors, first [{}] {}",
            errors.len(),
            first.category,
            first.message
        )),
    }
}

// ── 3. Determinism ──────────────────────────────────────────────────────

fn layout(level: &DungeonGenerator<ChaCha8Rng>) -> Vec<(String, String)> {
    level
        .generated_tiles()
        .iter()
        .map(|t| {
            let prefab = level
                .world()
                .get::<&Placement>(t.tile)
                .map(|p| p.prefab.clone())
                .unwrap_or_default();
            let bounds = level
                .tile_bounds(t.tile)
                .map(|b| format!("{:?}", b))
                .unwrap_or_default();
            (prefab, bounds)
        })
        .collect()
}

fn validate_determinism(args: &Args, config: &GeneratorConfig, catalog: &TileCatalog) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let fast = config.clone().with_construction_delay(0.0);

    let build = || -> Result<Vec<(String, String)>, GenerationError> {
        let mut level = generator(&fast, catalog, args.seed)?;
        level.run_to_completion()?;
        Ok(layout(&level))
    };
    match (build(), build()) {
        (Ok(a), Ok(b)) => vec![TestResult {
            name: "same_seed_same_level".into(),
            passed: a == b,
            detail: format!("seed {}: {} tiles", args.seed, a.len()),
        }],
        (Err(e), _) | (_, Err(e)) => vec![failure("same_seed_same_level", format!("{}", e))],
    }
}

// ── 4. Session ──────────────────────────────────────────────────────────

fn validate_session(args: &Args, config: &GeneratorConfig, catalog: &TileCatalog) -> Vec<TestResult> {
    println!("--- Session ---");
    let mut results = Vec::new();
    let fast = config.clone().with_construction_delay(0.0);
    let mut session = match generator(&fast, catalog, args.seed) {
        Ok(g) => Session::new(g),
        Err(e) => return vec![failure("session_setup", format!("{}", e))],
    };

    let overview_first = session.view() == ViewMode::Overview;
    if let Err(e) = session.run(|_| {}) {
        return vec![failure("session_run", format!("{}", e))];
    }
    results.push(TestResult {
        name: "session_reveal".into(),
        passed: overview_first && session.view() == ViewMode::FirstPerson,
        detail: "overview while building, first person once complete".into(),
    });

    session.handle(Command::ToggleOverview);
    let toggled = session.view() == ViewMode::Overview;
    session.handle(Command::ToggleOverview);
    results.push(TestResult {
        name: "session_toggle".into(),
        passed: toggled && session.view() == ViewMode::FirstPerson,
        detail: "overview toggles both ways".into(),
    });

    let mut rebuilt = 0;
    for _ in 0..args.reloads {
        session.handle(Command::ReloadLevel);
        let cleared = session.generator().generated_tiles().is_empty()
            && session.view() == ViewMode::Overview;
        if cleared && session.run(|_| {}).is_ok() {
            rebuilt += 1;
        }
    }
    results.push(TestResult {
        name: "session_reload".into(),
        passed: rebuilt == args.reloads,
        detail: format!("{}/{} reloads rebuilt a level", rebuilt, args.reloads),
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_selects_debug_logging() {
        let args = Args::parse_from(["tilecrawl-simtest", "--verbose"]);
        assert_eq!(log_level(args.verbose), LevelFilter::Debug);
        let args = Args::parse_from(["tilecrawl-simtest"]);
        assert_eq!(log_level(args.verbose), LevelFilter::Warn);
    }
}
