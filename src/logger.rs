use colored::{Color, ColoredString, Colorize};
use log::Level;
use std::io;

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Blue,
        Level::Debug => Color::Magenta,
        Level::Trace => Color::Green,
    }
}

/// Installs the global logger: `<level>: <message>` lines on stderr.
pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(move |out, message, record| {
            let level = record.level();
            out.finish(format_args!(
                "{} {}",
                ColoredString::from((level.to_string().to_lowercase() + ":").as_str())
                    .color(level_color(level)),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
}
