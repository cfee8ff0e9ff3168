//! corridor — one accident on a nine-junction grid, end to end.
//!
//! Seeds traffic samples, eight civilians and three ambulances, raises an
//! accident on E→F, runs one dispatch step and writes the resulting
//! broadcasts to `<out>/broadcasts.csv`.
//!
//! ```text
//! corridor [--out DIR] [--config engine.json]
//! RUST_LOG=erv_dispatch=debug,erv_reroute=debug corridor
//! ```

mod network;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use erv_core::{AccidentId, VehicleId, VehicleState};
use erv_dispatch::{
    Accident, AccidentPhase, Broadcast, BroadcastSink, CsvSink, DispatchObserver, DispatchResult,
    DispatcherBuilder, EngineConfig, FailureReason, StepReport,
};

use network::{Labels, build_grid};

// ── Scenario ──────────────────────────────────────────────────────────────────

const ACCIDENT: AccidentId = AccidentId(1);

/// (vehicle, junction sequence)
const CIVILIANS: [(u32, &str); 8] = [
    (1, "DEFI"),
    (2, "BEFC"),
    (3, "ADEF"),
    (4, "GHEF"),
    (5, "EF"),   // involved in the crash
    (6, "GHI"),
    (7, "CBA"),
    (8, "DEH"),
];

/// (vehicle, from, to, readiness)
const AMBULANCES: [(u32, char, char, f32); 3] = [
    (101, 'G', 'H', 0.9),
    (102, 'C', 'B', 1.0),
    (103, 'A', 'D', 0.6),
];

/// (from, to, vehicle count, average speed m/s)
const HOTSPOTS: [(char, char, u32, f32); 4] = [
    ('E', 'F', 18, 2.0),
    ('D', 'E', 14, 5.0),
    ('B', 'E', 9, 8.0),
    ('H', 'E', 6, 11.0),
];

// ── Command line ──────────────────────────────────────────────────────────────

struct Args {
    out:    PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { out: PathBuf::from("output/corridor"), config: None };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--out"    => args.out = it.next().context("--out needs a directory")?.into(),
            "--config" => args.config = Some(it.next().context("--config needs a path")?.into()),
            other      => bail!("unknown argument {other:?} (expected --out DIR or --config FILE)"),
        }
    }
    Ok(args)
}

// ── Output wrappers ───────────────────────────────────────────────────────────

/// Forwards to the CSV sink and prints each broadcast.
struct EchoSink<'l> {
    inner:  CsvSink,
    labels: &'l Labels,
    rows:   usize,
}

impl BroadcastSink for EchoSink<'_> {
    fn emit(&mut self, broadcast: &Broadcast) -> DispatchResult<()> {
        let ins = &broadcast.instruction;
        let route: Vec<String> = ins.route().iter().map(|&s| self.labels.label(s)).collect();
        println!(
            "  {:<9} {:<14} via {}",
            ins.kind(),
            ins.vehicle().to_string(),
            route.join(" → "),
        );
        self.rows += 1;
        self.inner.emit(broadcast)
    }

    fn finish(&mut self) -> DispatchResult<()> {
        self.inner.finish()
    }
}

#[derive(Default)]
struct Summary {
    phases:     Vec<AccidentPhase>,
    dispatched: Option<(VehicleId, usize)>,
    failure:    Option<FailureReason>,
}

impl DispatchObserver for Summary {
    fn on_phase(&mut self, _accident: AccidentId, phase: AccidentPhase, _tick: erv_core::Tick) {
        self.phases.push(phase);
    }

    fn on_dispatched(&mut self, _accident: AccidentId, erv: VehicleId, detours: usize) {
        self.dispatched = Some((erv, detours));
    }

    fn on_failed(&mut self, _accident: AccidentId, reason: &FailureReason) {
        self.failure = Some(reason.clone());
    }

    fn on_step_end(&mut self, report: &StepReport) {
        info!(
            tick = report.tick.0,
            dispatched = report.dispatched,
            failed = report.failed,
            broadcasts = report.broadcasts,
            "step complete"
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    println!("=== corridor — ERV dispatch on a 3×3 grid ===");
    println!("Seed: {}  |  Output: {}", config.seed, args.out.display());
    println!();

    // 1. Road network.
    let (network, labels) = build_grid()?;
    println!(
        "Road network: {} segments, {} connections, {} roadside units",
        network.segment_count(),
        network.adjacency_count(),
        network.rsu_count(),
    );

    // 2. Dispatcher.
    let mut dispatcher = DispatcherBuilder::new(config, network).build()?;

    // 3. Traffic samples: hotspots around E, light traffic elsewhere.
    let all: Vec<_> = dispatcher.context().network.segment_ids().collect();
    for id in all {
        dispatcher.record_sample(id, 2, 12.0)?;
    }
    for (from, to, count, speed) in HOTSPOTS {
        dispatcher.record_sample(labels.segment(from, to)?, count, speed)?;
    }

    // 4. Vehicles.
    for (id, junctions) in CIVILIANS {
        dispatcher.update_vehicle_state(VehicleState::civilian(VehicleId(id), labels.route(junctions)?))?;
    }
    for (id, from, to, readiness) in AMBULANCES {
        dispatcher.update_vehicle_state(VehicleState::erv(VehicleId(id), labels.segment(from, to)?, readiness))?;
    }
    println!("Vehicles: {} civilians, {} ambulances", CIVILIANS.len(), AMBULANCES.len());

    // 5. Accident on E→F.
    let scene = labels.segment('E', 'F')?;
    dispatcher.on_accident_detected(
        Accident::new(ACCIDENT, scene, dispatcher.now()).with_involved(vec![VehicleId(5)]),
    )?;
    println!("Accident {ACCIDENT} on {}", labels.label(scene));
    println!();

    // 6. One step.
    std::fs::create_dir_all(&args.out)?;
    let mut sink = EchoSink { inner: CsvSink::new(&args.out)?, labels: &labels, rows: 0 };
    let mut summary = Summary::default();

    println!("Broadcasts:");
    let t0 = Instant::now();
    dispatcher.step(&mut sink, &mut summary)?;
    let elapsed = t0.elapsed();
    sink.finish()?;
    println!();

    // 7. Summary.
    let phases: Vec<&str> = summary.phases.iter().map(|p| p.as_str()).collect();
    println!("Step complete in {:.3} ms", elapsed.as_secs_f64() * 1e3);
    println!("  phases          : {}", phases.join(" → "));
    match (summary.dispatched, &summary.failure) {
        (Some((erv, detours)), _) => println!("  dispatched      : {erv} with {detours} detour(s)"),
        (None, Some(reason))      => println!("  failed          : {reason}"),
        (None, None)              => println!("  no decision this step"),
    }
    if let Some(score) = dispatcher.context().scores.cached(scene) {
        println!("  scene congestion: {:.2} / 10", score.value);
    }
    println!("  {:<16}: {} rows", CsvSink::FILE_NAME, sink.rows);

    Ok(())
}
