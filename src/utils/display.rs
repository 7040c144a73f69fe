use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

use crate::models::message::ChatEmbed;
use crate::services::commands::ChatReply;

/// Renders chat replies for the terminal.
pub struct DisplayFormatter;

impl DisplayFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_header(&self, text: &str) -> String {
        format!("\n=== {} ===", text.bright_white().bold())
    }

    pub fn format_field_table(&self, embed: &ChatEmbed) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

        for field in &embed.fields {
            table.add_row(Row::new(vec![
                Cell::new(&field.name).style_spec("b"),
                Cell::new(&field.value),
            ]));
        }

        table.to_string()
    }

    pub fn format_embed(&self, embed: &ChatEmbed) -> String {
        let mut output = Vec::new();
        output.push(self.format_header(&embed.title));
        output.push(embed.description.truecolor(231, 76, 60).to_string());
        if let Some(thumbnail) = &embed.thumbnail {
            output.push(format!("Thumbnail: {}", thumbnail.url.dimmed()));
        }
        output.push(self.format_field_table(embed));
        if let Some(footer) = &embed.footer {
            output.push(footer.text.dimmed().to_string());
        }

        output.join("\n")
    }

    pub fn format_reply(&self, reply: &ChatReply) -> String {
        match reply {
            ChatReply::Embed(embed) => self.format_embed(embed),
            ChatReply::Text { content, ephemeral: true } => content.yellow().to_string(),
            ChatReply::Text { content, ephemeral: false } => content.clone(),
        }
    }
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self::new()
    }
}
