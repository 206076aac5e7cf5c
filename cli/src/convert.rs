use std::sync::Arc;

use drawexport::{Frame, GifOptions};

use crate::args::Args;

pub fn convert(args: &Args) -> Result<(), String> {
    if let Ok(()) = log::set_logger(&LOGGER) {
        let level =
            if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
        log::set_max_level(level);
    }

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    for font_path in &args.font_paths {
        fontdb.load_fonts_dir(font_path);
    }

    let frames = args
        .frames
        .iter()
        .map(|path| {
            let markup = std::fs::read_to_string(path)
                .map_err(|err| format!("failed to load {}: {err}", path.display()))?;
            Ok(Frame { markup, delay: args.delay })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let options = GifOptions {
        optimizer: args.gifsicle.clone(),
        temp_dir: None,
        fontdb: Some(Arc::new(fontdb)),
    };

    drawexport::write_animation(&frames, &args.output, &options)
        .map_err(|err| err.to_string())
}

// Taken from resvg
/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
