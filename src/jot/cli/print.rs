use chrono::{DateTime, Utc};
use colored::Colorize;
use jot::api::{CmdMessage, LimitsView, MessageLevel, Stats};
use jot::config::JotConfig;
use jot::error::{JotError, Result};
use jot::lock;
use jot::model::{Note, Tier};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const SIZE_WIDTH: usize = 10;
const LOCK_MARKER: &str = "⚿";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_note_content(content: &str) {
    print!("{}", content);
    if !content.is_empty() && !content.ends_with('\n') {
        println!();
    }
}

pub(super) fn print_notes(notes: &[Note], tier: Tier) {
    if notes.is_empty() {
        return;
    }

    let name_width = notes
        .iter()
        .map(|n| n.name.width())
        .max()
        .unwrap_or(0)
        .min(24);

    for note in notes {
        let locked = lock::required_token(&note.content).is_some();
        let prefix = if locked {
            format!("{} ", LOCK_MARKER)
        } else {
            "  ".to_string()
        };

        let partition = match tier {
            Tier::Backup => format!("{} ", note.date_dir),
            Tier::Active => String::new(),
        };

        let name = truncate_to_width(&note.name, name_width + 1);
        let name_padding = name_width.saturating_sub(name.width());

        let preview: String = if locked {
            "(locked)".to_string()
        } else {
            note.content
                .chars()
                .take(80)
                .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
                .collect()
        };

        let fixed_width = prefix.width()
            + partition.width()
            + name_width
            + 1
            + SIZE_WIDTH
            + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let preview = truncate_to_width(&preview, available);
        let padding = available.saturating_sub(preview.width());

        println!(
            "{}{}{}{} {}{}{}{}",
            prefix.yellow(),
            partition.dimmed(),
            name.bold(),
            " ".repeat(name_padding),
            preview.dimmed(),
            " ".repeat(padding),
            format!("{:>width$}", format_size(note.size), width = SIZE_WIDTH),
            format_time_ago(note.updated_at).dimmed()
        );
    }
}

pub(super) fn print_stats(stats: &Stats) {
    println!(
        "{:<14}{} / {}",
        "Notes:",
        stats.active_notes,
        stats.limits.max_note_count
    );
    println!(
        "{:<14}{} / {}",
        "Size:",
        format_size(stats.active_bytes),
        format_size(stats.limits.max_total_size)
    );
    println!("{:<14}{}", "Locked:", stats.locked_notes);
    println!("{:<14}{}", "Backup:", stats.backup_notes);
}

pub(super) fn print_limits(limits: &LimitsView) {
    println!(
        "{:<16}{} ({} bytes)",
        "Max file size:",
        format_size(limits.max_file_size),
        limits.max_file_size
    );
    println!(
        "{:<16}{} ({} bytes)",
        "Max total size:",
        format_size(limits.max_total_size),
        limits.max_total_size
    );
    println!("{:<16}{}", "Max notes:", limits.max_note_count);
}

pub(super) fn print_config(config: &JotConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).map_err(JotError::Serialization)?;
    println!("{}", json);
    Ok(())
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
