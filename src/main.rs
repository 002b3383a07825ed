//! PersonDetect Firmware: Main Entry Point
//!
//! Hexagonal architecture: one-time setup, then a fixed-cadence
//! capture → invoke → respond loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  FsStorage      BspCamera / SyntheticCamera   MonotonicClock   │
//! │  (StoragePort)  (ImageSource)                 (Clock)          │
//! │  TflmEngine / SimEngine   LogResponder        LogEventSink     │
//! │  (GraphEngine)            (DetectionResponder)(EventSink)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            DetectorService (pure logic)                │    │
//! │  │  Lifecycle · Interpreter · Arena · Pipeline · Stats    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use persondetect::config::DetectorConfig;

fn log_banner(config: &DetectorConfig) {
    info!("╔══════════════════════════════════════╗");
    info!("║  PersonDetect v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    match serde_json::to_string(config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => log::warn!("Config not serialisable: {}", e),
    }
}

// ── Device ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use log::{error, warn};

    use persondetect::adapters::bsp::{BspCamera, TflmEngine};
    use persondetect::adapters::log_sink::LogEventSink;
    use persondetect::adapters::responder::LogResponder;
    use persondetect::adapters::storage::{DEFAULT_MAX_FILE_BYTES, FsStorage};
    use persondetect::adapters::time::MonotonicClock;
    use persondetect::app::service::DetectorService;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = DetectorConfig::default();
    log_banner(&config);

    // ── 2. Peripherals ────────────────────────────────────────
    // A failed mount leaves reads failing, which setup reports as a
    // storage failure.
    let storage = FsStorage::mount_spiffs(DEFAULT_MAX_FILE_BYTES).unwrap_or_else(|e| {
        warn!("SPIFFS unavailable ({}), model read will fail", e);
        FsStorage::default()
    });
    let mut camera = match BspCamera::new() {
        Ok(c) => c,
        Err(e) => {
            error!("Camera init failed ({}), halting", e);
            halt();
        }
    };
    let clock = MonotonicClock::new();
    let mut responder = LogResponder::new();
    let mut sink = LogEventSink::new();

    // ── 3. Setup ──────────────────────────────────────────────
    let mut service = DetectorService::new(config);
    if service.setup(&storage, TflmEngine::new(), &mut sink).is_err() {
        halt();
    }

    // ── 4. Inference loop ─────────────────────────────────────
    info!("System ready. Entering inference loop.");
    loop {
        let _ = service.run_cycle(&mut camera, &mut responder, &clock, &mut sink);
    }
}

/// Park the main task forever; the controller produces no inferences.
#[cfg(target_os = "espidf")]
fn halt() -> ! {
    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}

// ── Host simulation ───────────────────────────────────────────

/// Cycles the host simulation runs before printing stats and exiting.
#[cfg(not(target_os = "espidf"))]
const HOST_SIM_CYCLES: u64 = 20;

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    use persondetect::adapters::log_sink::LogEventSink;
    use persondetect::adapters::responder::LogResponder;
    use persondetect::adapters::sim::{SimEngine, SimStorage, SyntheticCamera};
    use persondetect::adapters::time::MonotonicClock;
    use persondetect::app::service::DetectorService;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DetectorConfig::default();
    log_banner(&config);

    let storage = SimStorage::with_person_model();
    let mut camera = SyntheticCamera::failing_every(7);
    let clock = MonotonicClock::new();
    let mut responder = LogResponder::new();
    let mut sink = LogEventSink::new();

    let mut service = DetectorService::new(config);
    service.setup(&storage, SimEngine::new(), &mut sink)?;

    info!("Simulation ready. Running {} cycles.", HOST_SIM_CYCLES);
    for _ in 0..HOST_SIM_CYCLES {
        if service
            .run_cycle(&mut camera, &mut responder, &clock, &mut sink)
            .is_none()
        {
            break;
        }
    }

    if let Some(Ok(json)) = service.session().map(|s| serde_json::to_string(s.stats())) {
        info!("Final stats: {}", json);
    }
    Ok(())
}
