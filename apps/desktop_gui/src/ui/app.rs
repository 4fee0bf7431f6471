use std::{path::PathBuf, time::Duration};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiErrorCategory, UiEvent},
    orchestration::dispatch_backend_command,
    reducer::ChatState,
};

pub struct ChatApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    config_file: PathBuf,
    state: ChatState,
    input: String,
    focus_input: bool,
}

impl ChatApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        config_file: PathBuf,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            config_file,
            state: ChatState::default(),
            input: String::new(),
            focus_input: true,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.state.apply(event);
        }
    }

    fn send_input(&mut self) {
        let line = std::mem::take(&mut self.input);
        self.focus_input = true;
        if line.trim().is_empty() {
            return;
        }
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Perform { line },
            &mut self.state.status,
        ) {
            self.state.command_sent();
        } else {
            self.state.command_refused();
        }
    }

    fn restart_browser(&mut self) {
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Initialize {
                config_file: self.config_file.clone(),
            },
            &mut self.state.status,
        ) {
            self.state.command_sent();
        } else {
            self.state.command_refused();
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.state.status_banner.clone() else {
            return;
        };
        let (fill, stroke) = match banner.category {
            UiErrorCategory::Element | UiErrorCategory::Syntax => (
                egui::Color32::from_rgb(112, 88, 40),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(180, 148, 82)),
            ),
            UiErrorCategory::Browser | UiErrorCategory::Transport | UiErrorCategory::Unknown => (
                egui::Color32::from_rgb(111, 53, 53),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
            ),
        };

        egui::Frame::NONE
            .fill(fill)
            .stroke(stroke)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.state.dismiss_banner();
                        }
                    });
                });
            });
    }

    fn show_input_row(&mut self, ui: &mut egui::Ui) {
        let mut send = false;
        ui.horizontal(|ui| {
            let button_width = 64.0;
            let edit = egui::TextEdit::singleline(&mut self.input)
                .hint_text("click Add to Cart")
                .desired_width(ui.available_width() - button_width - ui.spacing().item_spacing.x);
            let edit_resp = ui.add(edit);
            if self.focus_input {
                edit_resp.request_focus();
                self.focus_input = false;
            }
            if edit_resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send = true;
            }
            if ui
                .add_sized([button_width, edit_resp.rect.height()], egui::Button::new("Send"))
                .clicked()
            {
                send = true;
            }
        });
        if send {
            self.send_input();
        }
    }

    fn show_status_line(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.state.is_busy() {
                ui.spinner();
            }
            ui.label(egui::RichText::new(&self.state.status).weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.state.is_busy(), egui::Button::new("Restart browser"))
                    .clicked()
                {
                    self.restart_browser();
                }
            });
        });
    }

    fn show_transcript(&mut self, ui: &mut egui::Ui) {
        let mut text = self.state.transcript_text();
        egui::ScrollArea::vertical()
            .id_salt("transcript_scroll")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut text)
                        .font(egui::TextStyle::Monospace)
                        .desired_width(f32::INFINITY)
                        .interactive(false),
                );
            });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("chat_input")
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                self.show_input_row(ui);
                self.show_status_line(ui);
                ui.add_space(4.0);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            self.show_transcript(ui);
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
