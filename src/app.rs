//! Sakura Stage — egui/eframe host view.
//!
//! # Architecture
//!
//! [`StageApp`] is the top-level [`eframe::App`].  It owns the two widget
//! components and the receiving ends of their capability channels:
//!
//! * [`PetalField`] — ticked once per frame, painted over the full panel.
//! * [`SpeechController`] — fed from `speech_rx`, polled for the fallback
//!   timer, driven by the stage buttons.
//! * [`Announcer`] — fed from `playback_rx`, driven by the announcement card.
//!
//! Both components are created on construction and torn down when the app
//! is dropped; `on_exit` aborts any live recognition session first so no
//! capability task outlives the window.
//!
//! # Stage views
//!
//! | Phase | Visual |
//! |-------|--------|
//! | `Idle` | hint + "Hacer el pedido" button |
//! | `ListenOrder` / `ListenThanks` | mic dot + live transcript (final + interim) |
//! | `ConfirmOrder` | cook confirmation + "Dar las gracias" button |
//! | `ConfirmFarewell` | cook farewell + "Intentar de nuevo" button |

use std::time::Instant;

use eframe::egui;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::field::{paint_field, FieldCounts, PetalField};
use crate::speech::{
    Announcer, PlaybackEvent, SessionEvent, SpeakPhase, SpeechController,
};

// ---------------------------------------------------------------------------
// Fixed stage copy (from the challenge script)
// ---------------------------------------------------------------------------

const COOK_GREETING: &str = "いらっしゃいませ！ご注文はお決まりですか？";
const COOK_CONFIRM_JP: &str = "かしこまりました。少々お待ちください。";
const COOK_CONFIRM_ES: &str = "Entendido — en seguida se lo preparamos.";
const COOK_FAREWELL_JP: &str = "ありがとうございました。またのお越しをお待ちしております。";
const COOK_FAREWELL_ES: &str = "¡Gracias! Le esperamos de nuevo pronto.";

// ---------------------------------------------------------------------------
// StageApp
// ---------------------------------------------------------------------------

/// eframe application — the Kyoto speak-challenge stage.
pub struct StageApp {
    // ── Petal field ──────────────────────────────────────────────────────
    /// Created lazily on the first frame with a non-empty viewport; `None`
    /// means there is no drawable surface yet and nothing ticks.
    field: Option<PetalField>,
    field_counts: FieldCounts,

    // ── Speech interaction ───────────────────────────────────────────────
    speech: SpeechController,
    speech_rx: mpsc::Receiver<SessionEvent>,

    // ── Announcement playback ────────────────────────────────────────────
    announcer: Announcer,
    playback_rx: mpsc::Receiver<PlaybackEvent>,

    // ── Configuration ────────────────────────────────────────────────────
    config: AppConfig,
}

impl StageApp {
    pub fn new(
        speech: SpeechController,
        speech_rx: mpsc::Receiver<SessionEvent>,
        announcer: Announcer,
        playback_rx: mpsc::Receiver<PlaybackEvent>,
        config: AppConfig,
    ) -> Self {
        Self {
            field: None,
            field_counts: FieldCounts {
                large: config.field.large_petals,
                small: config.field.small_petals,
            },
            speech,
            speech_rx,
            announcer,
            playback_rx,
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending capability events (non-blocking).
    fn poll_events(&mut self) {
        while let Ok(event) = self.speech_rx.try_recv() {
            self.speech.handle_event(event);
        }
        while let Ok(event) = self.playback_rx.try_recv() {
            self.announcer.handle_event(event);
        }
    }

    /// Remember the window's outer position so it can be persisted on exit.
    /// `None` (no window yet, or a headless backend) leaves the last value.
    fn remember_window_position(&mut self, outer: Option<egui::Rect>) {
        if let Some(rect) = outer {
            self.config.ui.window_position = Some((rect.min.x, rect.min.y));
        }
    }

    // ── Petal field lifecycle ────────────────────────────────────────────

    /// Create the field on the first usable frame, keep its bounds in sync
    /// afterwards, and advance it one tick.
    fn tick_field(&mut self, rect: egui::Rect) {
        match &mut self.field {
            None => match PetalField::new(rect.width(), rect.height(), self.field_counts) {
                Ok(field) => self.field = Some(field),
                Err(e) => {
                    // Fatal precondition for the simulator only; the rest of
                    // the widget keeps working and we retry next frame.
                    log::error!("cannot start petal field: {e}");
                }
            },
            Some(field) => {
                field.resize(rect.width(), rect.height());
                field.tick();
            }
        }
    }

    // ── Stage panels ─────────────────────────────────────────────────────

    fn draw_stage(&mut self, ui: &mut egui::Ui) {
        match self.speech.phase() {
            SpeakPhase::Idle => self.draw_idle(ui),
            SpeakPhase::ListenOrder | SpeakPhase::ListenThanks => self.draw_listening(ui),
            SpeakPhase::ConfirmOrder => {
                self.draw_cook_response(ui, COOK_CONFIRM_JP, COOK_CONFIRM_ES);
                if self.stage_button(ui, "🎙  Dar las gracias") {
                    self.speech.start_thanks(Instant::now());
                }
            }
            SpeakPhase::ConfirmFarewell => {
                self.draw_cook_response(ui, COOK_FAREWELL_JP, COOK_FAREWELL_ES);
                if self.stage_button(ui, "↩  Intentar de nuevo") {
                    self.speech.reset();
                }
            }
        }
    }

    fn draw_idle(&mut self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new("— Pulsa el botón cuando estés listo —")
                .color(egui::Color32::from_rgb(160, 140, 150))
                .size(13.0),
        );
        ui.add_space(8.0);
        if self.stage_button(ui, "🎙  Hacer el pedido") {
            self.speech.start_order(Instant::now());
        }
    }

    fn draw_listening(&self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label(egui::RichText::new("●").color(egui::Color32::from_rgb(255, 80, 100)));

            let final_text = self.speech.final_transcript();
            let interim_text = self.speech.interim_transcript();

            if final_text.is_empty() && interim_text.is_empty() {
                ui.label(
                    egui::RichText::new("▌")
                        .color(egui::Color32::from_rgb(255, 200, 215))
                        .size(16.0),
                );
                return;
            }
            if !final_text.is_empty() {
                ui.label(
                    egui::RichText::new(final_text)
                        .color(egui::Color32::WHITE)
                        .size(16.0),
                );
            }
            if !interim_text.is_empty() {
                ui.label(
                    egui::RichText::new(interim_text)
                        .color(egui::Color32::from_rgb(255, 170, 195))
                        .italics()
                        .size(16.0),
                );
            }
        });
    }

    fn draw_cook_response(&self, ui: &mut egui::Ui, jp: &str, es: &str) {
        ui.label(
            egui::RichText::new(jp)
                .color(egui::Color32::from_rgb(255, 220, 230))
                .size(16.0),
        );
        ui.label(
            egui::RichText::new(es)
                .color(egui::Color32::from_rgb(170, 150, 160))
                .italics()
                .size(12.0),
        );
        ui.add_space(8.0);
    }

    fn stage_button(&self, ui: &mut egui::Ui, label: &str) -> bool {
        ui.add(egui::Button::new(
            egui::RichText::new(label).size(14.0),
        ))
        .clicked()
    }

    // ── Announcement card ────────────────────────────────────────────────

    fn draw_announcement(&mut self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new("アナウンス — JR KYOTO LINE")
                .color(egui::Color32::from_rgb(200, 180, 190))
                .size(12.0),
        );
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui
                .add(egui::Button::new(egui::RichText::new("▶").size(14.0)))
                .clicked()
            {
                self.announcer.play();
            }
            ui.label(
                egui::RichText::new(self.announcer.status().label())
                    .color(egui::Color32::from_rgb(150, 135, 145))
                    .size(11.0),
            );
        });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for StageApp {
    /// Called every frame by eframe.  Drains channels, advances the fallback
    /// timer and the petal field, then renders the stage.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();
        self.speech.poll(Instant::now());
        self.remember_window_position(ctx.input(|i| i.viewport().outer_rect));

        let frame = egui::Frame::new().fill(egui::Color32::from_rgb(26, 18, 30));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let rect = ui.max_rect();

            // Petal field first — everything else is drawn on top of it.
            self.tick_field(rect);
            if let Some(field) = &self.field {
                paint_field(
                    ui.painter(),
                    rect,
                    egui::Color32::from_rgb(26, 18, 30),
                    field,
                );
            }

            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("京都 × ライブ")
                        .color(egui::Color32::from_rgb(255, 235, 242))
                        .size(24.0),
                );
                ui.label(
                    egui::RichText::new("Reto 02 · Hablar · Pedir")
                        .color(egui::Color32::from_rgb(180, 160, 170))
                        .size(12.0),
                );
            });

            ui.add_space(24.0);
            ui.group(|ui| {
                ui.label(
                    egui::RichText::new(COOK_GREETING)
                        .color(egui::Color32::from_rgb(255, 220, 230))
                        .size(14.0),
                );
                ui.add_space(12.0);
                self.draw_stage(ui);
            });

            ui.add_space(24.0);
            ui.group(|ui| {
                self.draw_announcement(ui);
            });
        });

        // The petal field animates continuously at the host's frame cadence.
        ctx.request_repaint();
    }

    /// Abort any live recognition session and persist the window position
    /// (best-effort) before the window goes away.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.speech.reset();
        self.field = None;
        if let Err(e) = self.config.save() {
            log::warn!("could not save settings on exit: {e}");
        }
        log::info!("sakura stage closing ({}×{} window)",
            self.config.ui.window_width, self.config.ui.window_height);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{SessionConfig, Utterance};
    use std::time::Duration;

    fn app() -> StageApp {
        let (speech_tx, speech_rx) = mpsc::channel(4);
        let (playback_tx, playback_rx) = mpsc::channel(4);
        let speech = SpeechController::new(
            None,
            SessionConfig::for_language("ja-JP"),
            speech_tx,
            Duration::from_secs(2),
        );
        let announcer = Announcer::new(
            None,
            Utterance {
                text: "テスト".into(),
                language: "ja-JP".into(),
                rate: 1.0,
                pitch: 1.0,
            },
            playback_tx,
        );
        StageApp::new(speech, speech_rx, announcer, playback_rx, AppConfig::default())
    }

    #[test]
    fn window_position_is_tracked_for_persistence() {
        let mut app = app();
        assert_eq!(app.config.ui.window_position, None);

        app.remember_window_position(Some(egui::Rect::from_min_size(
            egui::pos2(120.0, 80.0),
            egui::vec2(520.0, 760.0),
        )));
        assert_eq!(app.config.ui.window_position, Some((120.0, 80.0)));
    }

    #[test]
    fn missing_viewport_keeps_the_last_known_position() {
        let mut app = app();
        app.remember_window_position(Some(egui::Rect::from_min_size(
            egui::pos2(30.0, 40.0),
            egui::vec2(520.0, 760.0),
        )));

        app.remember_window_position(None);
        assert_eq!(app.config.ui.window_position, Some((30.0, 40.0)));
    }
}
