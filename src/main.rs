//! Tubefetch - YouTube Video Downloader
//!
//! A desktop application for downloading YouTube videos at a chosen
//! quality tier. Built with Rust and egui for cross-platform use
//! (Windows, Linux, macOS).

// Import all modules
mod app;
mod config;
mod data_structures;
mod download_worker;
mod gui;
mod helper_functions;
mod logging;
mod options;
mod streams;
mod tool_manager;

// Re-export commonly used items
pub use config::*;
pub use data_structures::*;
pub use download_worker::*;
pub use helper_functions::*;
pub use logging::*;
pub use options::*;
pub use streams::*;
pub use tool_manager::*;

use crate::logging::LOGGER;

// Third-party crate imports
use eframe::egui;

// Platform-specific imports
#[cfg(windows)]
use windows::Win32::Foundation::POINT;
#[cfg(windows)]
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTONEAREST,
};
#[cfg(windows)]
use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

/// Initialize the application with logging
fn initialize_app() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = setup_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting Tubefetch application");
    Ok(())
}

/// Calculate window position to center on the currently used monitor
fn calculate_window_position(window_size: [f32; 2]) -> egui::Pos2 {
    #[cfg(windows)]
    {
        unsafe {
            let mut point = POINT { x: 0, y: 0 };
            if GetCursorPos(&mut point).is_ok() {
                let monitor = MonitorFromPoint(point, MONITOR_DEFAULTTONEAREST);
                let mut info = MONITORINFO {
                    cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                    ..Default::default()
                };
                if GetMonitorInfoW(monitor, &mut info).as_bool() {
                    let work_left = info.rcWork.left;
                    let work_top = info.rcWork.top;
                    let work_width = (info.rcWork.right - info.rcWork.left) as f32;
                    let work_height = (info.rcWork.bottom - info.rcWork.top) as f32;
                    let x = work_left as f32 + (work_width - window_size[0]) / 2.0;
                    let y = work_top as f32 + (work_height - window_size[1]) / 2.0;
                    return egui::Pos2::new(x, y);
                }
            }
            egui::Pos2::new(100.0, 100.0)
        }
    }

    #[cfg(not(windows))]
    {
        // Most window managers place the window themselves; this is only a
        // fallback hint
        let _ = window_size;
        egui::Pos2::new(100.0, 100.0)
    }
}

/// Configure the application window
fn configure_window() -> eframe::NativeOptions {
    let window_size = WINDOW_SIZE;
    let center_pos = calculate_window_position(window_size);

    let viewport_builder = egui::ViewportBuilder::default()
        .with_inner_size(window_size)
        .with_position(center_pos)
        .with_decorations(true)
        .with_resizable(true)
        .with_min_inner_size(MIN_WINDOW_SIZE);

    eframe::NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    }
}

/// Apply the dark theme with the green accent used by the status panel
fn configure_visuals(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();

    visuals.override_text_color = Some(egui::Color32::from_rgb(230, 237, 243));
    visuals.widgets.active.bg_fill = egui::Color32::from_rgb(46, 160, 67);
    visuals.widgets.hovered.bg_fill = egui::Color32::from_rgb(63, 185, 80);
    visuals.widgets.inactive.bg_fill = egui::Color32::from_rgb(33, 38, 45);
    visuals.widgets.noninteractive.bg_fill = egui::Color32::from_rgb(22, 27, 34);
    visuals.selection.bg_fill = egui::Color32::from_rgb(46, 160, 67);
    visuals.hyperlink_color = egui::Color32::from_rgb(63, 185, 80);
    visuals.warn_fg_color = egui::Color32::from_rgb(210, 153, 34);
    visuals.error_fg_color = egui::Color32::from_rgb(248, 81, 73);

    ctx.set_visuals(visuals);
}

/// Cleanup resources when the application exits
fn cleanup_on_exit() {
    // Shutdown logger when app exits
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.take() {
            logger.shutdown();
        }
    }
}

fn main() {
    if let Err(e) = initialize_app() {
        eprintln!("Failed to initialize application: {}", e);
        return;
    }

    let native_options = configure_window();

    info!(
        "Initializing GUI with window size: {}x{}",
        WINDOW_SIZE[0], WINDOW_SIZE[1]
    );

    let result = eframe::run_native(
        "Tubefetch",
        native_options,
        Box::new(|cc| {
            configure_visuals(&cc.egui_ctx);

            info!("GUI initialized successfully");
            Box::new(VideoDownloader::with_options(ControllerOptions::default()))
        }),
    );

    cleanup_on_exit();

    result.expect("Failed to start eframe");
}
