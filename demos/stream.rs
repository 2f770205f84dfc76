//! Poll sensor positions from the first active hub.
//!
//! Usage: cargo run --features native --example stream -- <config.g4c>
//! Press Ctrl+C to stop.

use g4track::{
    NativeDriver, OpenOptions, OrientationUnit, PositionUnit, Target, Tracker, UnitConfig,
};
use std::time::{Duration, Instant};

/// Native frame period of the G4 (120 Hz).
const FRAME_PERIOD: Duration = Duration::from_micros(8333);

fn main() {
    env_logger::init();

    let config = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "first_calibration.g4c".to_string());

    let units = UnitConfig::new(PositionUnit::Centimeter, OrientationUnit::EulerDegree);
    let tracker = match NativeDriver::new()
        .and_then(|driver| Tracker::open_with(driver, &config, &OpenOptions::new().units(units)))
    {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to open tracker: {}", e);
            std::process::exit(1);
        }
    };

    let hub = match tracker.lock().and_then(|mut s| s.active_hubs()) {
        Ok(hubs) if !hubs.is_empty() => hubs[0],
        Ok(_) => {
            eprintln!("No active hubs");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to list hubs: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = tracker.lock().and_then(|mut s| s.reset_boresight(Target::Hub(hub))) {
        eprintln!("Boresight reset failed: {}", e);
    }

    println!("Streaming hub {} (Ctrl+C to stop)...", hub);

    let start = Instant::now();
    let mut count: u64 = 0;
    let mut stale: u64 = 0;

    loop {
        let tick = Instant::now();
        match tracker.lock().and_then(|mut s| s.get_hub_frame(hub)) {
            Ok((frame, counts)) if counts.is_complete(1) => {
                count += 1;
                if count % 120 == 1 {
                    for (slot, pose) in frame.active_sensors() {
                        println!(
                            "frame={:<8} sensor {}  pos=[{:+.2}, {:+.2}, {:+.2}] cm",
                            frame.frame, slot, pose.position[0], pose.position[1], pose.position[2],
                        );
                    }
                }
            }
            Ok(_) => stale += 1,
            Err(e) if e.status().is_some_and(g4track::frame::is_no_data) => stale += 1,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }

        if let Some(rest) = FRAME_PERIOD.checked_sub(tick.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "\nTotal: {} frames ({} stale) in {:.1}s ({:.1} Hz)",
        count,
        stale,
        elapsed,
        count as f64 / elapsed
    );
}
