use super::print::{
    print_config, print_limits, print_messages, print_note_content, print_notes, print_stats,
};
use super::AppContext;
use jot::api::{LimitsUpdate, LockChange};
use jot::error::{JotError, Result};
use jot::model::Tier;
use std::io::Read;
use std::time::Duration;

pub fn new(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.new_note()?;
    if let Some(name) = &result.name {
        println!("{}", name);
    }
    Ok(())
}

pub fn save(
    ctx: &AppContext,
    name: &str,
    content: Option<String>,
    lock: Option<String>,
    unlock: bool,
    token: Option<String>,
) -> Result<()> {
    let content = match content {
        Some(content) => content,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(JotError::Io)?;
            buf
        }
    };

    let lock_change = match (lock, unlock) {
        (Some(token), _) => LockChange::Set(token),
        (None, true) => LockChange::Clear,
        (None, false) => LockChange::Keep,
    };

    let result = ctx
        .api
        .save_note(name, &content, token.as_deref(), lock_change)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn show(ctx: &AppContext, name: &str, token: Option<String>, raw: bool) -> Result<()> {
    let result = ctx.api.view_note(name, token.as_deref(), raw)?;
    print_note_content(result.content.as_deref().unwrap_or_default());
    Ok(())
}

pub fn rm(ctx: &AppContext, name: &str, token: Option<String>) -> Result<()> {
    let result = ctx.api.delete_note(name, token.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

pub fn lock(ctx: &AppContext, name: &str, token: &str, current: Option<String>) -> Result<()> {
    let result = ctx.api.lock_note(name, token, current.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

pub fn unlock(ctx: &AppContext, name: &str, token: &str) -> Result<()> {
    let result = ctx.api.unlock_note(name, token)?;
    print_messages(&result.messages);
    Ok(())
}

pub fn list(ctx: &AppContext, backup: bool) -> Result<()> {
    let tier = if backup { Tier::Backup } else { Tier::Active };
    let result = ctx.api.list_notes(tier)?;
    print_notes(&result.listed_notes, tier);
    print_messages(&result.messages);
    Ok(())
}

pub fn sweep(ctx: &AppContext, days: Option<u32>, every: Option<u64>) -> Result<()> {
    let Some(hours) = every else {
        let result = ctx.api.sweep(days)?;
        print_messages(&result.messages);
        return Ok(());
    };

    let mut schedule = ctx.api.sweep_schedule();
    if let Some(days) = days {
        schedule.inactivity = chrono::Duration::days(days as i64);
    }
    schedule.interval = Duration::from_secs(hours.max(1) * 3600);

    let _handle = ctx.api.spawn_sweeper(schedule)?;
    eprintln!("Sweeping every {} hour(s); stop with Ctrl-C.", hours.max(1));
    loop {
        std::thread::park();
    }
}

pub fn doctor(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.doctor()?;
    print_messages(&result.messages);
    Ok(())
}

pub fn stats(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.stats()?;
    if let Some(stats) = &result.stats {
        print_stats(stats);
    }
    Ok(())
}

pub fn limits(
    ctx: &mut AppContext,
    max_file_size: Option<u64>,
    max_total_size: Option<u64>,
    max_note_count: Option<usize>,
) -> Result<()> {
    let result = ctx.api.limits(LimitsUpdate {
        max_file_size,
        max_total_size,
        max_note_count,
    })?;
    print_messages(&result.messages);
    if let Some(limits) = &result.limits {
        print_limits(limits);
    }
    Ok(())
}

pub fn config(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.config()?;
    if let Some(config) = &result.config {
        print_config(config)?;
    }
    print_messages(&result.messages);
    Ok(())
}
