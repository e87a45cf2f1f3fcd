use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_RATE: Duration = Duration::from_millis(100);
const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Spinner currently on screen, if any. Log output is printed above it.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Clears the spinner when dropped.
pub struct SpinnerGuard {
    pb: ProgressBar,
}

impl SpinnerGuard {
    pub fn set_message(&self, msg: impl Into<String>) {
        self.pb.set_message(msg.into());
    }
}

impl Drop for SpinnerGuard {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
        ACTIVE
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

pub fn start(msg: &str) -> SpinnerGuard {
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS);

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(TICK_RATE);

    *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb.clone());
    SpinnerGuard { pb }
}

/// Log sink that prints above the active spinner, or to stdout when no
/// spinner is running.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let active = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner);
        match active.as_ref() {
            Some(pb) => {
                let msg = String::from_utf8_lossy(buf);
                pb.println(msg.trim_end());
            }
            None => io::stdout().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
