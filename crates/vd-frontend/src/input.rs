//! egui events to session input

use std::collections::BTreeMap;

use glam::Vec2;
use vd_core::{DepthKey, InputEvent};

/// Converts raw egui events into [`InputEvent`]s relative to the viewport
#[derive(Debug, Default)]
pub struct InputMapper {
    /// Active touches by id, in viewport pixels
    touches: BTreeMap<u64, Vec2>,
    /// Whether the primary button went down inside the viewport
    pressed: bool,
    last_size: Option<Vec2>,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    fn current_touches(&self) -> Vec<Vec2> {
        self.touches.values().copied().collect()
    }

    /// `Resize` when the viewport size changed since the last call
    pub fn resize(&mut self, size: egui::Vec2) -> Option<InputEvent> {
        let size = Vec2::new(size.x, size.y);
        if size.x <= 0.0 || size.y <= 0.0 || self.last_size == Some(size) {
            return None;
        }
        self.last_size = Some(size);
        Some(InputEvent::Resize {
            width: size.x,
            height: size.y,
        })
    }

    /// Map one frame's events. Pointer events synthesized from touches are
    /// dropped so a finger is seen only once.
    pub fn map_events(
        &mut self,
        events: &[egui::Event],
        rect: egui::Rect,
        time: f64,
    ) -> Vec<InputEvent> {
        let local = |pos: egui::Pos2| Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y);
        let touch_frame = events.iter().any(|e| matches!(e, egui::Event::Touch { .. }));
        let mut out = Vec::new();

        for event in events {
            match event {
                egui::Event::Touch { id, phase, pos, .. } => {
                    let position = local(*pos);
                    match phase {
                        egui::TouchPhase::Start => {
                            if self.touches.is_empty() && !rect.contains(*pos) {
                                continue;
                            }
                            self.touches.insert(id.0, position);
                            out.push(InputEvent::TouchStart {
                                touches: self.current_touches(),
                                time,
                            });
                        }
                        egui::TouchPhase::Move => {
                            if let Some(touch) = self.touches.get_mut(&id.0) {
                                *touch = position;
                                out.push(InputEvent::TouchMove {
                                    touches: self.current_touches(),
                                });
                            }
                        }
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                            if self.touches.remove(&id.0).is_some() {
                                out.push(InputEvent::TouchEnd {
                                    released: position,
                                    remaining: self.current_touches(),
                                    time,
                                });
                            }
                        }
                    }
                }
                _ if touch_frame || !self.touches.is_empty() => {}
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        if rect.contains(*pos) {
                            self.pressed = true;
                            out.push(InputEvent::PointerDown {
                                position: local(*pos),
                                time,
                            });
                        }
                    } else if self.pressed {
                        self.pressed = false;
                        out.push(InputEvent::PointerUp {
                            position: local(*pos),
                            time,
                        });
                    }
                }
                egui::Event::PointerMoved(pos) => out.push(InputEvent::PointerMove {
                    position: local(*pos),
                }),
                egui::Event::PointerGone => {
                    if self.pressed {
                        self.pressed = false;
                        out.push(InputEvent::PointerCancel);
                    }
                }
                egui::Event::Key {
                    key, pressed: true, ..
                } => {
                    if let Some(key) = depth_key(*key) {
                        out.push(InputEvent::Key(key));
                    }
                }
                _ => {}
            }
        }

        out
    }
}

/// Map a scroll delta in points to a wheel event. egui scrolls up with
/// positive values; the session expects positive for scrolling down.
pub fn wheel_event(scroll_y: f32) -> Option<InputEvent> {
    (scroll_y != 0.0).then_some(InputEvent::Wheel { delta_y: -scroll_y })
}

fn depth_key(key: egui::Key) -> Option<DepthKey> {
    let c = match key {
        egui::Key::Q => 'q',
        egui::Key::W => 'w',
        egui::Key::E => 'e',
        egui::Key::S => 's',
        _ => return None,
    };
    DepthKey::from_char(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(800.0, 600.0))
    }

    fn button(x: f32, y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    fn touch(id: u64, phase: egui::TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(id),
            phase,
            pos: egui::pos2(x, y),
            force: None,
        }
    }

    #[test]
    fn test_click_is_relative_to_viewport() {
        let mut mapper = InputMapper::new();
        let events = mapper.map_events(&[button(110.0, 120.0, true)], rect(), 1.5);
        assert_eq!(
            events,
            vec![InputEvent::PointerDown {
                position: Vec2::new(100.0, 100.0),
                time: 1.5,
            }]
        );

        let events = mapper.map_events(&[button(115.0, 120.0, false)], rect(), 1.6);
        assert!(matches!(events[0], InputEvent::PointerUp { .. }));
    }

    #[test]
    fn test_press_outside_viewport_ignored() {
        let mut mapper = InputMapper::new();
        assert!(mapper.map_events(&[button(5.0, 5.0, true)], rect(), 0.0).is_empty());
        assert!(mapper.map_events(&[button(5.0, 5.0, false)], rect(), 0.1).is_empty());
    }

    #[test]
    fn test_pointer_gone_cancels_press() {
        let mut mapper = InputMapper::new();
        mapper.map_events(&[button(110.0, 120.0, true)], rect(), 0.0);
        let events = mapper.map_events(&[egui::Event::PointerGone], rect(), 0.1);
        assert_eq!(events, vec![InputEvent::PointerCancel]);
    }

    #[test]
    fn test_two_finger_touch_sequence() {
        let mut mapper = InputMapper::new();
        let events = mapper.map_events(
            &[
                touch(1, egui::TouchPhase::Start, 110.0, 120.0),
                button(110.0, 120.0, true),
            ],
            rect(),
            0.0,
        );
        // The synthesized mouse press is dropped
        assert_eq!(events.len(), 1);

        let second = touch(2, egui::TouchPhase::Start, 210.0, 120.0);
        let events = mapper.map_events(&[second], rect(), 0.1);
        match &events[0] {
            InputEvent::TouchStart { touches, .. } => assert_eq!(touches.len(), 2),
            other => panic!("unexpected {other:?}"),
        }

        let lifted = touch(1, egui::TouchPhase::End, 110.0, 140.0);
        let events = mapper.map_events(&[lifted], rect(), 0.2);
        assert_eq!(
            events,
            vec![InputEvent::TouchEnd {
                released: Vec2::new(100.0, 120.0),
                remaining: vec![Vec2::new(200.0, 100.0)],
                time: 0.2,
            }]
        );
        assert_eq!(mapper.touch_count(), 1);
    }

    #[test]
    fn test_depth_keys() {
        let mut mapper = InputMapper::new();
        let key = |key| egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::default(),
        };
        let keys = [key(egui::Key::W), key(egui::Key::S), key(egui::Key::A)];
        let events = mapper.map_events(&keys, rect(), 0.0);
        assert_eq!(
            events,
            vec![
                InputEvent::Key(DepthKey::Push),
                InputEvent::Key(DepthKey::Pull)
            ]
        );
    }

    #[test]
    fn test_resize_only_on_change() {
        let mut mapper = InputMapper::new();
        assert!(mapper.resize(egui::vec2(800.0, 600.0)).is_some());
        assert!(mapper.resize(egui::vec2(800.0, 600.0)).is_none());
        assert!(mapper.resize(egui::vec2(0.0, 600.0)).is_none());
    }

    #[test]
    fn test_wheel_direction() {
        assert_eq!(wheel_event(-120.0), Some(InputEvent::Wheel { delta_y: 120.0 }));
        assert_eq!(wheel_event(0.0), None);
    }
}
