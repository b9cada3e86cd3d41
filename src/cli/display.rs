// src/cli/display.rs
use crate::domain::bookmark_data::{BookmarkData, BookmarkRecord};
use crate::domain::tag::Tag;
use crossterm::style::Stylize;
use std::io::{self, Write};

/// Number of records listed before the preview is cut short
pub const PREVIEW_LIMIT: usize = 10;

fn format_record(record: &BookmarkRecord) -> String {
    let tags = if record.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", Tag::format_tags(&record.tags))
    };
    format!("{}{}", record.title.clone().green(), tags.yellow())
}

/// Lists the first records of `data` so the user knows what they confirm
pub fn show_import_preview<W: Write>(out: &mut W, data: &BookmarkData) -> io::Result<()> {
    writeln!(out, "Found {}:", data)?;
    for record in data.bookmarks.iter().take(PREVIEW_LIMIT) {
        writeln!(out, "  {}", format_record(record))?;
        writeln!(out, "    {}", record.url)?;
    }
    if data.len() > PREVIEW_LIMIT {
        writeln!(out, "  ... and {} more", data.len() - PREVIEW_LIMIT)?;
    }
    Ok(())
}
