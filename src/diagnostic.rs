use crate::span::Span;

/// A settings diagnostic (error or warning).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.range()))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        let _ = report
            .finish()
            .eprint((filename, Source::from(source)));
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let span = Span::new(10, 15);
        let d = Diagnostic::error("unknown block `Xx`".to_string(), span);
        assert_eq!(d.severity, Severity::Error);
        assert!(d.is_error());
        assert_eq!(d.message, "unknown block `Xx`");
        assert_eq!(d.span.start, 10);
        assert_eq!(d.span.end, 15);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_warning_construction() {
        let d = Diagnostic::warning("unknown key `colour`".to_string(), Span::dummy());
        assert_eq!(d.severity, Severity::Warning);
        assert!(!d.is_error());
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::error("bad goal".to_string(), Span::new(0, 5))
            .with_note("goal was `speed`".to_string())
            .with_help("use output, fuel_use, efficiency or irradiation".to_string())
            .with_note("in section [reactor]".to_string());
        assert_eq!(d.notes.len(), 2);
        assert!(d.help.is_some());
    }
}
