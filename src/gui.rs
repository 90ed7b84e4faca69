//! GUI rendering components for the tubefetch video downloader
//!
//! This module contains all the UI rendering methods and the eframe
//! application loop.

use eframe::egui;
use rfd::FileDialog;

use crate::{
    config::{APP_VERSION, SAVE_DIALOG_EXTENSION},
    data_structures::{Quality, VideoDownloader},
    helper_functions::Utils,
    info,
};

// Accent colors for the status frame, matching the classic green-on-black
// look of the download panel
const STATUS_TEXT_COLOR: egui::Color32 = egui::Color32::from_rgb(80, 250, 123);
const STATUS_FRAME_FILL: egui::Color32 = egui::Color32::from_rgb(12, 12, 12);
const PROGRESS_FILL: egui::Color32 = egui::Color32::from_rgb(46, 160, 67);

impl VideoDownloader {
    /// Render the application header
    pub fn render_header(&self, ui: &mut egui::Ui) {
        ui.heading(format!("Tubefetch v{} - YouTube Video Downloader", APP_VERSION));
        ui.add_space(5.0);
    }

    /// Render extraction tool status with an install action when missing
    pub fn render_tool_status(&mut self, ui: &mut egui::Ui) {
        if self.is_tool_available() {
            let unknown = "unknown version".to_string();
            let version = self.get_tool_version().unwrap_or(&unknown);
            ui.label(format!("✅ yt-dlp is installed: {}", version));
        } else if self.is_installing_tool() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Downloading yt-dlp...");
            });
        } else {
            ui.horizontal(|ui| {
                ui.label("❌ yt-dlp not found");
                if ui.button("Install yt-dlp").clicked() {
                    self.start_tool_install();
                }
            });
        }
    }

    /// Render the link input field
    pub fn render_link_input(&mut self, ui: &mut egui::Ui) {
        ui.label("Video link:");
        ui.add(
            egui::TextEdit::singleline(&mut self.link_input)
                .hint_text("Please Enter Link")
                .desired_width(f32::INFINITY),
        );
    }

    /// Render the filename input field
    pub fn render_filename_input(&mut self, ui: &mut egui::Ui) {
        ui.label("File name:");
        ui.add(
            egui::TextEdit::singleline(&mut self.filename_input)
                .hint_text("Please Enter Video Name")
                .desired_width(f32::INFINITY),
        );
    }

    /// Render the three exclusive quality choices, Medium preselected
    pub fn render_quality_selection(&mut self, ui: &mut egui::Ui) {
        ui.label("Quality:");
        ui.horizontal(|ui| {
            ui.radio_value(&mut self.quality, Some(Quality::Low), "Low");
            ui.radio_value(&mut self.quality, Some(Quality::Medium), "Medium");
            ui.radio_value(&mut self.quality, Some(Quality::High), "High");
        });
    }

    /// Render the download button; disabled while a download is in flight
    /// or no extraction tool is available
    pub fn render_download_button(&mut self, ui: &mut egui::Ui) {
        let enabled = !self.is_downloading() && self.is_tool_available() && !self.is_installing_tool();
        if ui
            .add_enabled(enabled, egui::Button::new("Download"))
            .clicked()
        {
            self.on_download_clicked();
        }
    }

    /// Validation, save dialog, then worker launch
    fn on_download_clicked(&mut self) {
        let Some((link, filename, quality)) = self.validate_inputs() else {
            return;
        };
        info!("Inputs validated, prompting for save path");
        let suggested = Utils::suggested_file_name(&filename);
        let save_path = FileDialog::new()
            .set_title("Save Video")
            .set_file_name(suggested.as_str())
            .add_filter("Video Files", &[SAVE_DIALOG_EXTENSION])
            .save_file();
        self.handle_save_choice(link, quality, save_path);
    }

    /// Render the status line and progress bar in their framed panel
    pub fn render_status_panel(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(STATUS_FRAME_FILL)
            .inner_margin(egui::Margin::same(12.0))
            .rounding(egui::Rounding::same(4.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    if self.is_downloading() {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(
                                egui::RichText::new(self.get_status())
                                    .color(STATUS_TEXT_COLOR)
                                    .strong()
                                    .size(18.0),
                            );
                        });
                    } else {
                        ui.label(
                            egui::RichText::new(self.get_status())
                                .color(STATUS_TEXT_COLOR)
                                .strong()
                                .size(18.0),
                        );
                    }
                });
                ui.add_space(8.0);
                let progress_bar = egui::ProgressBar::new(self.get_progress() as f32 / 100.0)
                    .fill(PROGRESS_FILL)
                    .desired_width(ui.available_width());
                ui.add(progress_bar);
            });
    }
}

impl eframe::App for VideoDownloader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply worker progress and installer results before drawing
        self.poll_worker();
        self.handle_installation_state();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            self.render_tool_status(ui);
            ui.separator();

            self.render_link_input(ui);
            self.render_filename_input(ui);
            ui.add_space(4.0);
            self.render_quality_selection(ui);
            ui.add_space(8.0);
            self.render_download_button(ui);

            ui.add_space(12.0);
            self.render_status_panel(ui);
        });

        if self.is_downloading() || self.is_installing_tool() {
            // Frequent repaints keep the spinner and bar smooth
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.is_downloading() {
            info!("Application closed with a download in flight");
        }
        info!("Application closed by user");
        info!("");
        info!("---------------------------------------------------------------");
        info!("");
    }
}
