use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

/// Channel a user-facing line was reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    pub fn marker(self) -> &'static str {
        match self {
            Level::Info => "[+] ",
            Level::Error => "[!] ",
        }
    }
}

/// Destination for the human-readable progress lines the tool prints.
///
/// Diagnostics go through `tracing`; this is only for what the user is
/// meant to read.
pub trait Reporter {
    fn report(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Writes each line to stdout and flushes immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Reporter for Console {
    fn report(&self, level: Level, message: &str) {
        let mut stdout = std::io::stdout().lock();
        // Nothing sensible to do if stdout is gone.
        let _ = writeln!(stdout, "{}{message}", level.marker());
        let _ = stdout.flush();
    }
}

/// Keeps every reported line in memory.
#[derive(Debug, Default)]
pub struct Captured {
    lines: Mutex<Vec<(Level, String)>>,
}

impl Captured {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines as they would have been printed, markers included.
    pub fn rendered(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|(level, message)| format!("{}{message}", level.marker()))
            .collect()
    }
}

impl Reporter for Captured {
    fn report(&self, level: Level, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}
