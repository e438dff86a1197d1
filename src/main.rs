// LAV VM host - Main Entry Point
//
// Loads and validates a LAV program and shows the VM screen. No interpreter
// is attached yet, so the screen carries a test pattern written through the
// graph RAM view.

use gvm_rs::display::run_viewer;
use gvm_rs::screen::{Screen, ScreenError, PLANE_SIZE};
use gvm_rs::{MemoryMappedDevice, ProgramImage, ViewerConfig};
use log::info;
use std::env;
use std::path::Path;
use std::process;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: gvm-rs <program.lav>");
        process::exit(1);
    };

    let config = ViewerConfig::load_or_default();

    let image = match ProgramImage::from_file(&path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            process::exit(1);
        }
    };
    info!(
        "Loaded {} ({} bytes, magic {}, body at {:#06X})",
        path,
        image.size(),
        image.header().magic_str(),
        image.position()
    );

    let mut screen = Screen::new();
    screen.set_color(config.colors.black, config.colors.white);
    draw_test_pattern(&mut screen)?;

    let name = Path::new(&path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    run_viewer(config, screen, &name)?;

    info!("Viewer closed.");
    Ok(())
}

/// Fill the graph RAM with a 4×4 checkerboard
fn draw_test_pattern(screen: &mut Screen) -> Result<(), ScreenError> {
    let bytes_per_row = screen.width() / 8;
    let mut ram = screen.graph_ram()?;
    for offset in 0..PLANE_SIZE {
        let row = offset / bytes_per_row;
        let byte = if (row / 4) % 2 == 0 { 0xF0 } else { 0x0F };
        ram.write(offset as u16, byte);
    }
    Ok(())
}
