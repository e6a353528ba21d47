//! Buildpack log output.
//!
//! Staging logs are read by operators in the platform build output, which
//! has its own conventions: every step starts with `-----> `, everything
//! beneath a step is indented by seven spaces so it lines up with the step
//! text, and warnings and errors are tagged inline.
//!
//! Structured diagnostics for developers go through `tracing`; the shell is
//! only for what the operator sees.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

/// Indentation for lines beneath a step.
pub const INDENT: &str = "       ";

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    /// Default: steps, info and warnings
    #[default]
    Normal,
    /// --verbose: also debug lines
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Line kinds, each with its own prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Step,
    Info,
    Warning,
    Error,
    Debug,
}

impl Line {
    fn prefix(self) -> &'static str {
        match self {
            Line::Step => "-----> ",
            Line::Info => INDENT,
            Line::Warning => "       **WARNING** ",
            Line::Error => "       **ERROR** ",
            Line::Debug => "       DEBUG: ",
        }
    }

    fn color_code(self) -> Option<&'static str> {
        match self {
            Line::Step => Some("\x1b[1;34m"),
            Line::Warning => Some("\x1b[1;33m"),
            Line::Error => Some("\x1b[1;31m"),
            Line::Info | Line::Debug => None,
        }
    }
}

type Sink = Box<dyn Write + Send>;

/// Central shell for build log output.
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
    out: Mutex<Sink>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("verbosity", &self.verbosity)
            .field("use_color", &self.use_color)
            .finish()
    }
}

impl Shell {
    /// Create a shell writing to stdout.
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
            out: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create an uncolored shell writing into a shared buffer.
    pub fn buffered(verbosity: Verbosity) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let shell = Shell {
            verbosity,
            use_color: false,
            out: Mutex::new(Box::new(SharedBuffer(Arc::clone(&buffer)))),
        };
        (shell, buffer)
    }

    /// Create a shell from CLI flags.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity, color)
    }

    /// Start a new step: `-----> msg`.
    pub fn begin_step(&self, msg: impl Display) {
        self.print(Line::Step, msg);
    }

    /// A line beneath the current step.
    pub fn info(&self, msg: impl Display) {
        self.print(Line::Info, msg);
    }

    /// A warning beneath the current step.
    pub fn warn(&self, msg: impl Display) {
        self.print(Line::Warning, msg);
    }

    /// An error beneath the current step; printed even in quiet mode.
    pub fn error(&self, msg: impl Display) {
        self.print(Line::Error, msg);
    }

    /// Verbose-only detail.
    pub fn debug(&self, msg: impl Display) {
        self.print(Line::Debug, msg);
    }

    fn print(&self, line: Line, msg: impl Display) {
        let show = match self.verbosity {
            Verbosity::Quiet => line == Line::Error,
            Verbosity::Normal => line != Line::Debug,
            Verbosity::Verbose => true,
        };
        if !show {
            return;
        }

        let text = match (self.use_color, line.color_code()) {
            (true, Some(color)) => format!("{}{}{}\x1b[0m", color, line.prefix(), msg),
            _ => format!("{}{}", line.prefix(), msg),
        };

        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", text);
            let _ = out.flush();
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut inner) => inner.write(buf),
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "log buffer poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
