//! Print hubs, station maps and sources of a connected G4 system.
//!
//! Usage: cargo run --features native --example info -- <config.g4c>

use g4track::{NativeDriver, OrientationUnit, PositionUnit, Tracker, UnitConfig};

fn main() {
    env_logger::init();

    let config = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "first_calibration.g4c".to_string());

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &str) -> g4track::Result<()> {
    let tracker = Tracker::open(NativeDriver::new()?, config)?;
    println!("System:   {}", tracker.system_id());

    let mut session = tracker.lock()?;
    let units = session.units()?;
    println!("Units:    {:?} / {:?}", units.position, units.orientation);

    for hub in session.active_hubs()? {
        let map = session.station_map(hub)?;
        println!("Hub {:<4}  stations={:#05b}", hub, map.bits());
    }

    let source_units = UnitConfig::new(PositionUnit::Centimeter, OrientationUnit::EulerDegree);
    for src in session.source_map(source_units)? {
        println!(
            "Source {}  freq={}  pos=[{:+.2}, {:+.2}, {:+.2}] cm",
            src.id, src.frequency, src.position[0], src.position[1], src.position[2],
        );
    }

    Ok(())
}
