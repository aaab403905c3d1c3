// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

mod terminal;
mod util;

use indicatif::{ProgressBar, ProgressStyle};
use pressuremat_host_core::serial::SerialLineSource;
use pressuremat_host_core::{
    ControllerConfig, HeatmapScale, MAT_COLS, MAT_ROWS, PollOutcome, PressureMatController,
};
use std::io::{Error as IoError, Result as IoResult};
use std::time::Duration;
use terminal::TerminalCanvas;

const SERIAL_TIMEOUT: Duration = Duration::from_secs(1);
const DEVICE_SETTLE_TIME: Duration = Duration::from_secs(2);
const CALIBRATION_POLL_PAUSE: Duration = Duration::from_millis(10);
const FRAME_PERIOD: Duration = Duration::from_millis(1000 / 60);
const CELL_SIZE: u32 = 1;

fn main() -> IoResult<()> {
    let args: Vec<String> = std::env::args().collect();
    let log_level = util::parse_log_level(&args);

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let viewer_args = util::ViewerArgs::from_args(&args)?;

    log::info!("Pressure Mat Viewer ({}x{})", MAT_ROWS, MAT_COLS);

    let port_name = match viewer_args.port {
        Some(port_name) => port_name,
        None => {
            let ports = serialport::available_ports().map_err(IoError::other)?;
            log::info!("Available serial ports:");
            for port in &ports {
                log::info!("  - {}", port.port_name);
            }
            match ports.into_iter().next() {
                Some(port) => port.port_name,
                None => {
                    log::error!("No serial ports found!");
                    std::process::exit(1);
                }
            }
        }
    };

    log::info!("Connecting to: {} at {} baud", port_name, viewer_args.baud_rate);
    let mut source = match SerialLineSource::open(&port_name, viewer_args.baud_rate, SERIAL_TIMEOUT) {
        Ok(source) => source,
        Err(e) => {
            log::error!("Error opening serial port {}: {}", port_name, e);
            log::error!("Please check the port name given with --port.");
            std::process::exit(1);
        }
    };

    // Give device time to reset after the port opens
    std::thread::sleep(DEVICE_SETTLE_TIME);

    let config = ControllerConfig {
        calibration_samples: viewer_args.samples,
        scale: HeatmapScale::new(viewer_args.threshold, viewer_args.max_force),
        ..ControllerConfig::default()
    };
    let mut controller = PressureMatController::new(config);

    calibrate(&mut controller, &mut source)?;

    let mut canvas = TerminalCanvas::new(MAT_COLS as u32 * CELL_SIZE, MAT_ROWS as u32 * CELL_SIZE);
    let mut stdout = std::io::stdout().lock();
    TerminalCanvas::clear_screen(&mut stdout)?;
    redraw(&controller, &mut canvas, &mut stdout)?;

    loop {
        if controller.poll(&mut source)? == PollOutcome::NewFrame {
            redraw(&controller, &mut canvas, &mut stdout)?;
        }
        std::thread::sleep(FRAME_PERIOD);
    }
}

fn calibrate(controller: &mut PressureMatController, source: &mut SerialLineSource) -> IoResult<()> {
    log::info!("Calibrating...");
    let target = controller
        .calibration_progress()
        .map(|progress| progress.target)
        .unwrap_or(0);

    let progress_bar = ProgressBar::new(u64::from(target));
    progress_bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress_bar.set_message("Calibrating");

    while !controller.is_calibrated() {
        if let PollOutcome::Calibrating(progress) = controller.poll(source)? {
            progress_bar.set_position(u64::from(progress.collected));
        }
        std::thread::sleep(CALIBRATION_POLL_PAUSE);
    }

    progress_bar.finish_with_message("Calibrated");
    Ok(())
}

fn redraw<W: std::io::Write>(
    controller: &PressureMatController,
    canvas: &mut TerminalCanvas,
    out: &mut W,
) -> IoResult<()> {
    controller
        .draw(canvas, CELL_SIZE)
        .unwrap_or_else(|never| match never {});
    canvas.render(out)
}
