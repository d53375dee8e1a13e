use std::fs::File;

use anyhow::Context;
use time::{format_description::parse_borrowed, OffsetDateTime};
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, FmtSubscriber};

/// Logs everything to a fresh file named after the current time and `role`
/// (e.g. `dealer`, `player-2`).
pub fn init_logger(role: &str) -> anyhow::Result<()> {
    let file_name = get_log_file_name(role)?;
    let file = File::create(&file_name).with_context(|| format!("could not create {file_name}"))?;
    let writer = BoxMakeWriter::new(file);
    let local_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(
        local_offset,
        parse_borrowed::<2>("[year]-[month]-[day] [hour]:[minute]:[second]")?,
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(writer)
        .finish();

    set_global_default(subscriber)
        .context("could not set global default tracing subscriber, is one already set?")
}

fn get_log_file_name(role: &str) -> anyhow::Result<String> {
    let format = parse_borrowed::<2>("[year]-[month]-[day]_[hour]:[minute]:[second]")?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(format!("{}_{role}_log.txt", now.format(&format)?))
}
