//! Route `tracing` output to the browser console

use std::io;
use tracing::Level;
use web_sys::console;

/// Buffers one formatted event and hands it to `console.log` when dropped
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if !line.is_empty() {
            console::log_1(&line.into());
        }
    }
}

fn console_writer() -> ConsoleWriter {
    ConsoleWriter { buf: Vec::new() }
}

/// Default verbosity: debug builds show history movement, release builds
/// only loads, rejections and export warnings.
pub fn default_level() -> Level {
    if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the console subscriber. Later calls are no-ops.
pub fn init(level: Level) {
    // Browsers have no wall clock for the formatter and no ANSI colours.
    let _ = tracing_subscriber::fmt()
        .with_writer(console_writer)
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init();
}
