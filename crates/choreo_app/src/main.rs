// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless choreography runner.
//!
//! Builds a three-drone show through the command layer, plays it on the
//! shared clock at the configured frame rate, and logs every drone's pose
//! once per second of show time.
//!
//! Usage: `choreo [settings.ron]`

use choreo_app::{
    settings::SETTINGS_FILE_NAME, Axis, ChoreoSettings, Command, CommandOutcome, DroneId,
    HeadlessVisuals, Session, SettingsError,
};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const ROUTES: [&[[f32; 3]]; 3] = [
    &[[-2.0, 1.0, -2.0], [2.0, 1.0, -2.0], [2.0, 1.0, 2.0], [-2.0, 1.0, 2.0]],
    &[[0.0, 0.5, 0.0], [0.0, 3.0, 0.0], [0.0, 0.5, 0.0]],
    &[[3.0, 1.0, 0.0], [0.0, 2.0, 3.0], [-3.0, 1.0, 0.0], [0.0, 2.0, -3.0], [3.0, 1.0, 0.0]],
];

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("choreo_app=debug,choreo_timeline=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting choreo v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        tracing::error!("Choreography failed: {e}");
        std::process::exit(1);
    }
}

fn load_settings() -> Result<ChoreoSettings, SettingsError> {
    if let Some(path) = std::env::args_os().nth(1) {
        return ChoreoSettings::load(Path::new(&path));
    }
    let default_path = Path::new(SETTINGS_FILE_NAME);
    if default_path.exists() {
        ChoreoSettings::load(default_path)
    } else {
        tracing::info!("No {SETTINGS_FILE_NAME} found, using default settings");
        Ok(ChoreoSettings::default())
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(load_settings()?);
    let mut visuals = HeadlessVisuals::new();

    let mut ids = Vec::new();
    for route in ROUTES {
        ids.push(build_route(&mut session, &mut visuals, route)?);
    }
    session.execute(Command::Deselect, &mut visuals)?;

    for entry in session.list_ordered() {
        tracing::info!("{} ({} keyframes)", entry.label, entry.keyframes);
    }

    play_show(&mut session, &mut visuals);

    // Pick the first drone on screen, then delete and restore it
    let position = session.registry().get(ids[0]).map(|d| d.position());
    if let Some(position) = position {
        let screen = visuals.screen_point(position);
        session.execute(Command::PickAtScreen { screen }, &mut visuals)?;
        if let CommandOutcome::Deleted { index, .. } =
            session.execute(Command::DeleteSelected, &mut visuals)?
        {
            tracing::info!("{} drones left after deleting index {index}", session.registry().len());
        }
        session.execute(Command::Undo, &mut visuals)?;
    }

    session.shutdown(&mut visuals);
    Ok(())
}

/// Create a drone and key it through every waypoint of `route`
fn build_route(
    session: &mut Session,
    visuals: &mut HeadlessVisuals,
    route: &[[f32; 3]],
) -> Result<DroneId, Box<dyn std::error::Error>> {
    let spawn = route.first().copied();
    let CommandOutcome::Created(id) = session.execute(Command::CreateDrone { spawn }, visuals)? else {
        return Err("drone creation did not report an ID".into());
    };
    session.execute(Command::Select(id), visuals)?;

    for waypoint in route {
        for (axis, value) in [Axis::X, Axis::Y, Axis::Z].into_iter().zip(*waypoint) {
            session.execute(Command::SetManualPosition { axis, value }, visuals)?;
        }
        session.execute(Command::ApplyPositionToTimeline, visuals)?;
    }
    session.execute(Command::ClearManualOverride, visuals)?;
    Ok(id)
}

/// Run the shared clock past the longest track, logging poses every second
fn play_show(session: &mut Session, visuals: &mut HeadlessVisuals) {
    let show_length = session
        .registry()
        .iter()
        .map(|d| d.track().duration())
        .fold(0.0, f32::max)
        + 1.0;
    let interval = session.settings().frame_interval();
    let frame_interval = Duration::from_secs_f32(interval);
    let frames = (show_length / interval).ceil() as u32;

    let start = Instant::now();
    if let Err(e) = session.execute(Command::Play { at: start }, visuals) {
        tracing::warn!("Could not start playback: {e}");
        return;
    }

    let mut next_report = 0.0;
    for frame in 0..=frames {
        session.tick(start + frame_interval * frame, visuals);

        let time = session.clock().current_time();
        if time >= next_report {
            for drone in session.registry().iter() {
                let [x, y, z] = drone.position();
                tracing::info!("t={time:.2} {}: ({x:.2}, {y:.2}, {z:.2})", drone.label());
            }
            next_report += 1.0;
        }
    }

    if let Err(e) = session.execute(Command::Stop, visuals) {
        tracing::warn!("Could not stop playback: {e}");
    }
    tracing::info!(frames = session.frame_count(), "Show finished");
}
