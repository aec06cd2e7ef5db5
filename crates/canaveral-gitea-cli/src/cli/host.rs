//! Release host backed by the terminal

use canaveral_gitea::{InMemoryHost, LogLevel, ReleaseContext, ReleaseHost};

use super::output;

/// Host that keeps the context in memory and prints plugin log lines.
///
/// Lines go to the terminal through [`output`] and to the debug log file.
#[derive(Debug)]
pub struct ConsoleHost {
    inner: InMemoryHost,
    print: bool,
    verbose: bool,
}

impl ConsoleHost {
    /// Create a host; `print` enables console output
    pub fn new(context: ReleaseContext, dry_run: bool, print: bool, verbose: bool) -> Self {
        Self {
            inner: InMemoryHost::new(context).with_dry_run(dry_run),
            print,
            verbose,
        }
    }
}

impl ReleaseHost for ConsoleHost {
    fn context(&self) -> ReleaseContext {
        self.inner.context()
    }

    fn set_context(&self, key: &str, value: &str) {
        self.inner.set_context(key, value);
    }

    fn is_dry_run(&self) -> bool {
        self.inner.is_dry_run()
    }

    fn log(&self, level: LogLevel, message: &str) {
        tracing::debug!(level = %level, "{}", message);
        if !self.print {
            return;
        }
        match level {
            LogLevel::Error => output::error(message),
            LogLevel::Warn => output::warning(message),
            LogLevel::Info => output::info(message),
            LogLevel::Verbose if self.verbose => output::verbose(message),
            LogLevel::Verbose => {}
        }
    }
}
