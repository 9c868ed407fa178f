//! Status reporting on stderr.

use std::fmt::Display;

use console::{Style, Term};

/// Reporter for `autonav` runs. Styling is dropped when stderr is not a tty.
pub(crate) struct Output {
    term: Term,
    label: Style,
    done: Style,
    caution: Style,
    failure: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().bold(),
            done: Style::new().green(),
            caution: Style::new().yellow().bold(),
            failure: Style::new().red().bold(),
        }
    }

    /// `label: value` line, e.g. the config and output paths.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        self.line(format_args!("{} {value}", self.label.apply_to(format!("{label}:"))));
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(self.done.apply_to(msg));
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(format_args!("{} {msg}", self.caution.apply_to("warning:")));
    }

    /// Report the error that ends the run.
    pub(crate) fn error(&self, err: &dyn std::error::Error) {
        self.line(format_args!("{} {err}", self.failure.apply_to("error:")));
    }

    fn line(&self, text: impl Display) {
        let _ = self.term.write_line(&text.to_string());
    }
}
