//! Text overlays drawn on top of the rendered scene

/// Status line at the bottom of the viewport
pub fn paint_hint(painter: &egui::Painter, rect: egui::Rect, text: &str) {
    painter.text(
        egui::pos2(rect.center().x, rect.bottom() - 16.0),
        egui::Align2::CENTER_BOTTOM,
        text,
        egui::FontId::proportional(14.0),
        egui::Color32::from_rgb(70, 60, 50),
    );
}

/// Pin and nail counters at the top-left corner
pub fn paint_counts(painter: &egui::Painter, rect: egui::Rect, pins: usize, nails: usize) {
    painter.text(
        rect.left_top() + egui::vec2(12.0, 10.0),
        egui::Align2::LEFT_TOP,
        format!("pins: {}  nails: {}", pins, nails),
        egui::FontId::monospace(12.0),
        egui::Color32::from_rgb(90, 80, 70),
    );
}
