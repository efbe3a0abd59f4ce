use std::io::Write;

use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

pub use log::{debug, error, info, trace, warn};

pub const DEFAULT_FILTER: &str = "backdrop=info";

// Chatty dependencies that only matter when something is broken.
const QUIET_MODULES: [&str; 2] = ["cpal", "alsa"];

/// Installs the process logger on stderr. Later calls are no-ops.
/// `RUST_LOG` overrides [`DEFAULT_FILTER`].
pub fn init_logger() {
    init_logger_with(DEFAULT_FILTER);
}

pub fn init_logger_with(default_filter: &str) {
    let mut builder =
        Builder::from_env(Env::default().default_filter_or(default_filter));
    for module in QUIET_MODULES {
        builder.filter_module(module, LevelFilter::Warn);
    }

    builder.format(|_buf, record| {
        let writer = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = writer.buffer();

        let color = level_color(record.level());
        buffer.set_color(ColorSpec::new().set_fg(Some(color)))?;
        let target = record.module_path().unwrap_or(record.target());
        write!(buffer, "[{}][{}]", record.level(), target)?;
        buffer.reset()?;
        writeln!(buffer, " {}", record.args())?;
        writer.print(&buffer)
    });

    let _ = builder.try_init();
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Trace => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    }
}
