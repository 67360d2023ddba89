//! Table output for the message board using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::output::truncate;
use crate::domain::models::{Message, MessageStage};

/// Table formatter for the message board
pub struct BoardFormatter {
    use_colors: bool,
}

impl BoardFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Format messages (already newest first) as a table
    pub fn format(&self, messages: &[Message]) -> String {
        if messages.is_empty() {
            return "No messages.".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Message").add_attribute(Attribute::Bold),
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Received").add_attribute(Attribute::Bold),
        ]);

        for message in messages {
            let stage = message.stage();
            let stage_cell = if self.use_colors {
                Cell::new(stage.as_str()).fg(stage_color(stage))
            } else {
                Cell::new(stage.as_str())
            };
            table.add_row(vec![
                Cell::new(message.id),
                Cell::new(message.source.as_str()),
                Cell::new(truncate(&message.text, 40)),
                stage_cell,
                Cell::new(message.created_at.format("%H:%M:%S").to_string()),
            ]);
        }

        table.to_string()
    }
}

impl Default for BoardFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    console::colors_enabled()
}

fn stage_color(stage: MessageStage) -> Color {
    match stage {
        MessageStage::Normal => Color::White,
        MessageStage::Urgent => Color::Yellow,
        MessageStage::Court => Color::Red,
        MessageStage::Resolved => Color::Green,
    }
}
