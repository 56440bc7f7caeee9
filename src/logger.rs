use std::{path::Path, sync::OnceLock};
use tracing_subscriber::{fmt, EnvFilter};

static GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
static INIT: OnceLock<()> = OnceLock::new();

/// Initialize logging once for the whole process.
/// - `path`: e.g., "logs/perft.log"
/// - `filter`: e.g., "motley::moves::perft=trace"
pub fn init_logging<P: AsRef<Path>>(path: P, filter: &str) {
    INIT.get_or_init(|| {
        let path = path.as_ref();

        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("open log file");

        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        // Keep the guard alive for the program lifetime
        let _ = GUARD.set(guard);

        // RUST_LOG wins over the argument so tests stay overridable.
        let env_filter = if std::env::var_os("RUST_LOG").is_some() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let subscriber = fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(non_blocking)
            .finish();

        // Ignore error if someone already set a global subscriber (idempotent for tests)
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
