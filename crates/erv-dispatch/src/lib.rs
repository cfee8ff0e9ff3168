//! `erv-dispatch` — the accident orchestrator.
//!
//! # Per-accident state machine
//!
//! ```text
//! Detected ─► CongestionScored ─► ErvAssigned ─► ReroutesIssued ─► Dispatched
//!    ▲              │                  │               │
//!    │              └──────────────────┴───────────────┴──► Failed
//!    └──────────────────────── retrigger ─────────────────────┘
//! ```
//!
//! # Two-phase step
//!
//! ```text
//! Dispatcher::step:
//!   ① Collect   — every active accident in `Detected`, ascending AccidentId.
//!   ② Compute   — run one cycle per accident against a private pheromone copy
//!                 and its own RNG stream (parallel with the `parallel` feature).
//!   ③ Apply     — in ascending AccidentId order:
//!                   resolved meanwhile  → suppress (no broadcasts)
//!                   Failed              → record reason
//!                   ERV already claimed → defer back to Detected
//!                   Dispatched          → claim ERV, commit trails, emit
//! ```
//!
//! # Crate layout
//!
//! | Module           | Contents                                                 |
//! |------------------|----------------------------------------------------------|
//! | [`config`]       | `EngineConfig` (JSON, validated once at startup)         |
//! | [`context`]      | `SimContext`, `VehicleStore`                             |
//! | [`accident`]     | `Accident`, `AccidentStatus`, `AccidentPhase`, tracker   |
//! | [`instruction`]  | `BroadcastInstruction`, `Broadcast` envelope             |
//! | [`orchestrator`] | `Orchestrator::run_cycle`, `CycleOutcome`                |
//! | [`builder`]      | `DispatcherBuilder`                                      |
//! | [`dispatcher`]   | `Dispatcher` (feeds, accident registry, `step`)          |
//! | [`sink`]         | `BroadcastSink`, `MemorySink`, `CsvSink`                 |
//! | [`observer`]     | `DispatchObserver`, `NoopObserver`                       |
//! | [`error`]        | `DispatchError`, `DispatchResult<T>`                     |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Compute phase, GA evaluation and ants run on Rayon.      |

pub mod accident;
pub mod builder;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod instruction;
pub mod observer;
pub mod orchestrator;
pub mod sink;


pub use accident::{Accident, AccidentPhase, AccidentStatus, PhaseTracker};
pub use builder::DispatcherBuilder;
pub use config::EngineConfig;
pub use context::{SimContext, VehicleStore};
pub use dispatcher::{AccidentEntry, Dispatcher, ResolutionHandle, StepReport};
pub use error::{DispatchError, DispatchResult};
pub use instruction::{Broadcast, BroadcastInstruction};
pub use observer::{DispatchObserver, NoopObserver};
pub use orchestrator::{CycleInput, CycleOutcome, CycleReport, DispatchPlan, FailureReason, Orchestrator};
pub use sink::{BroadcastSink, CsvSink, MemorySink};
