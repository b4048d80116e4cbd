//! Main application

use vd_renderer::RendererConfig;

use crate::input::{InputMapper, wheel_event};
use crate::render_state::ViewportState;
use crate::state::{AppAction, SharedAppState, dispatch_action};
use crate::viewport::{paint_counts, paint_hint};

/// Main application
pub struct VoodooApp {
    app_state: SharedAppState,
    viewport_state: Option<ViewportState>,
    input: InputMapper,
    renderer_config: RendererConfig,
}

impl VoodooApp {
    /// Create a new app
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        app_state: SharedAppState,
        renderer_config: RendererConfig,
    ) -> Self {
        // Create viewport state if WGPU is available
        let viewport_state = cc.wgpu_render_state.as_ref().map(|render_state| {
            let device = render_state.device.clone();
            let queue = render_state.queue.clone();
            let format = render_state.target_format;

            ViewportState::new(device, queue, format, &renderer_config)
        });
        if viewport_state.is_none() {
            tracing::error!("No wgpu render state, the scene will not be drawn");
        }

        Self {
            app_state,
            viewport_state,
            input: InputMapper::new(),
            renderer_config,
        }
    }

    /// Show the rendered scene, or an inert area without a GPU
    fn show_viewport(&mut self, ui: &mut egui::Ui, frame: &eframe::Frame) -> egui::Response {
        let available_size = ui.available_size();
        let width = available_size.x as u32;
        let height = available_size.y as u32;

        let target = self
            .viewport_state
            .as_mut()
            .zip(frame.wgpu_render_state())
            .filter(|_| width > 0 && height > 0);
        let Some((viewport, render_state)) = target else {
            let (_, response) = ui.allocate_exact_size(available_size, egui::Sense::click_and_drag());
            return response;
        };

        let texture_id = {
            let mut egui_renderer = render_state.renderer.write();
            viewport.ensure_texture(width, height, &mut egui_renderer)
        };

        // Display the rendered texture
        ui.add(
            egui::Image::new(egui::load::SizedTexture::new(
                texture_id,
                [available_size.x, available_size.y],
            ))
            .sense(egui::Sense::click_and_drag()),
        )
    }

    /// Process pending actions
    fn process_actions(&mut self) {
        let mut state = self.app_state.lock();
        for action in state.take_pending_actions() {
            dispatch_action(action, &mut state);
        }
    }

    /// Turn this frame's raw input into queued actions
    fn collect_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let rect = response.rect;
        let mut actions = Vec::new();

        if let Some(resize) = self.input.resize(rect.size()) {
            actions.push(AppAction::Input(resize));
        }

        let (events, time, scroll) = ui.input(|i| (i.events.clone(), i.time, i.raw_scroll_delta.y));
        actions.extend(
            self.input
                .map_events(&events, rect, time)
                .into_iter()
                .map(AppAction::Input),
        );

        if response.hovered() {
            if let Some(wheel) = wheel_event(scroll) {
                actions.push(AppAction::Input(wheel));
            }
        }

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let position = glam::Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y);
                actions.push(AppAction::Input(vd_core::InputEvent::DoubleClick { position }));
            }
        }

        // Right mouse button orbits the camera
        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            let sensitivity = self.renderer_config.camera.orbit_sensitivity;
            actions.push(AppAction::OrbitCamera {
                delta_yaw: -delta.x * sensitivity,
                delta_pitch: delta.y * sensitivity,
            });
        }

        let mut state = self.app_state.lock();
        for action in actions {
            state.queue_action(action);
        }
    }
}

impl eframe::App for VoodooApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let delta = ctx.input(|i| i.unstable_dt);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let response = self.show_viewport(ui, frame);

                self.collect_input(ui, &response);
                self.process_actions();

                let mut state = self.app_state.lock();
                let stats = state.session.frame(delta);
                tracing::trace!(
                    "Frame {:.4}s: {} parts, {} pins, {} nails",
                    stats.delta,
                    stats.parts_synced,
                    stats.pins,
                    stats.nails
                );
                state.last_stats = stats;

                let session = &state.session;
                if let Some(viewport) = &mut self.viewport_state {
                    viewport.render(session.scene());
                }

                let painter = ui.painter_at(response.rect);
                paint_counts(&painter, response.rect, stats.pins, stats.nails);
                paint_hint(&painter, response.rect, session.hint());
            });

        ctx.request_repaint();
    }
}
