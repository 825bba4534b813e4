use log::Level;
use std::io::Write;

/// Installs the logger. `RUST_LOG` takes precedence over the verbosity flag.
pub fn init(verbosity: u8) {
    let mut builder = env_logger::Builder::new();

    builder
        .filter_level(verbosity_level(verbosity).to_level_filter())
        .parse_default_env()
        .format(|f, record| {
            writeln!(
                f,
                "{:>5} [{}] {}",
                prettyprint_level(record.level()),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// This maps the occurrence of `--verbose` flags to the correct log level
fn verbosity_level(num: u8) -> Level {
    match num {
        0 => Level::Info,
        1 => Level::Debug,
        2.. => Level::Trace,
    }
}

fn prettyprint_level(lvl: Level) -> &'static str {
    match lvl {
        Level::Error => "Error",
        Level::Warn => "Warn",
        Level::Info => "Info",
        Level::Debug => "Debug",
        Level::Trace => "Trace",
    }
}
