use std::time::{Duration, Instant};

const LIFETIME: Duration = Duration::from_secs(5);
const MAX_VISIBLE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Level {
    Info,
    Error,
}

struct Notification {
    level: Level,
    text: String,
    created: Instant,
}

/// Short lived messages shown in the corner of the window.
#[derive(Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Level::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text.into());
    }

    fn push(&mut self, level: Level, text: String) {
        self.items.push(Notification {
            level,
            text,
            created: Instant::now(),
        });
        if self.items.len() > MAX_VISIBLE {
            self.items.remove(0);
        }
    }

    fn expire(&mut self, now: Instant) {
        self.items
            .retain(|item| now.duration_since(item.created) < LIFETIME);
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        self.expire(Instant::now());
        if self.items.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .interactable(false)
            .show(ctx, |ui| {
                for item in &self.items {
                    let color = match item.level {
                        Level::Info => egui::Color32::from_rgb(16, 185, 129),
                        Level::Error => egui::Color32::from_rgb(239, 68, 68),
                    };
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, color))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(&item.text).color(color));
                        });
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_messages_expire() {
        let mut notifications = Notifications::default();
        notifications.info("loaded");
        notifications.error("failed");
        assert_eq!(notifications.items.len(), 2);

        notifications.expire(Instant::now() + LIFETIME);
        assert!(notifications.items.is_empty());
    }

    #[test]
    fn only_recent_messages_are_kept() {
        let mut notifications = Notifications::default();
        for i in 0..8 {
            notifications.info(format!("message {i}"));
        }
        assert_eq!(notifications.items.len(), MAX_VISIBLE);
        assert_eq!(notifications.items[0].text, "message 3");
        assert_eq!(notifications.items[0].level, Level::Info);
    }
}
