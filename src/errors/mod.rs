use crate::{pathlib::FilePath, span::Span};

use colored::*;
use std::fmt;
use std::io::{self, Write};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        )
    }
}

/// Stable identifiers for every diagnostic the parser can emit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DiagnosticCode {
    UnexpectedToken,
    ExpectedToken,
    MissingSeparator,
    MissingElement,
    UnclosedDelimiter,
    InvalidPattern,
    StrayTail,
    InvalidRest,
    AmbiguousGuard,
    InvalidSpawn,
    TooDeep,
    IllegalToken,
    EmptySelect,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnexpectedToken => "P0001",
            DiagnosticCode::ExpectedToken => "P0002",
            DiagnosticCode::MissingSeparator => "P0003",
            DiagnosticCode::MissingElement => "P0004",
            DiagnosticCode::UnclosedDelimiter => "P0005",
            DiagnosticCode::InvalidPattern => "P0006",
            DiagnosticCode::StrayTail => "P0007",
            DiagnosticCode::InvalidRest => "P0008",
            DiagnosticCode::AmbiguousGuard => "P0009",
            DiagnosticCode::InvalidSpawn => "P0010",
            DiagnosticCode::TooDeep => "P0011",
            DiagnosticCode::IllegalToken => "P0012",
            DiagnosticCode::EmptySelect => "W0001",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A secondary span with a short explanation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Label {
    pub span: Span,
    pub msg: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub msg: String,
    pub span: Span,
    pub severity: Severity,
    pub code: Option<DiagnosticCode>,
    pub help: Option<String>,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

const ELLIPSIS: &str = "...";

impl Diagnostic {
    pub fn new(severity: Severity, msg: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic {
            msg: msg.into(),
            span,
            severity,
            code: None,
            help: None,
            labels: vec![],
            notes: vec![],
        }
    }

    pub fn error(msg: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(Severity::Error, msg, span)
    }

    pub fn warning(msg: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(Severity::Warning, msg, span)
    }

    pub fn with_code(mut self, code: DiagnosticCode) -> Diagnostic {
        self.code = Some(code);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Diagnostic {
        self.help = Some(help.into());
        self
    }

    pub fn with_label(mut self, span: Span, msg: impl Into<String>) -> Diagnostic {
        self.labels.push(Label {
            span,
            msg: msg.into(),
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Diagnostic {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn emit(&self, src: &str, filepath: &FilePath) {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        // a closed stderr leaves nowhere to report to
        let _ = self.write_to(&mut out, src, filepath);
    }

    pub fn write_to<W: Write>(&self, out: &mut W, src: &str, filepath: &FilePath) -> io::Result<()> {
        let header = match self.code {
            Some(code) => format!("{}[{}]:", self.severity, code),
            None => format!("{}:", self.severity),
        };
        let header = match self.severity {
            Severity::Error => header.bold().red(),
            Severity::Warning => header.bold().yellow(),
            Severity::Note => header.bold().blue(),
        };
        writeln!(out, "{} {}", header, self.msg.bold())?;

        let lines = src.lines().collect::<Vec<_>>();
        let line_count = self.span.lines();
        let max_num_width = if line_count == 1 {
            (self.span.end.lineno + 1).to_string().len() + 1
        } else {
            ELLIPSIS.len() + 1
        };
        let full_spacing = " ".repeat(max_num_width);
        let pipe = "|".bold();
        let arrow = "-->".bold();

        writeln!(
            out,
            "{}{} {}:{}",
            " ".repeat(max_num_width - 1),
            arrow,
            filepath,
            self.span
        )?;
        writeln!(out, "{}{}", full_spacing, pipe)?;

        let red_slash = "/".bold().red();
        let red_pipe = "|".bold().red();
        if line_count == 1 {
            let line = lines.get(self.span.start.lineno).copied().unwrap_or("");
            let lineno_str = (self.span.start.lineno + 1).to_string();
            let spacing = " ".repeat(max_num_width - lineno_str.len());
            writeln!(out, "{}{}{} {}", lineno_str.bold(), spacing, pipe, line)?;
            let indent = " ".repeat(self.span.start.col);
            let width = self.span.end.col.saturating_sub(self.span.start.col).max(1);
            let indicator = "^".repeat(width).bold().red();
            writeln!(out, "{}{} {}{}", full_spacing, pipe, indent, indicator)?;
        } else {
            let shown = lines
                .iter()
                .enumerate()
                .skip(self.span.start.lineno)
                .take(line_count);
            for (i, (idx, line)) in shown.enumerate() {
                if line_count > 3 && i > 1 && i < line_count - 2 {
                    if i == 2 {
                        writeln!(out, "{} {} {} {}", ELLIPSIS.bold(), pipe, red_pipe, ELLIPSIS)?;
                    }
                    continue;
                }

                let lineno_str = (idx + 1).to_string();
                let spacing = " ".repeat(max_num_width - lineno_str.len());
                let prefix = if i == 0 { &red_slash } else { &red_pipe };
                writeln!(
                    out,
                    "{}{}{} {} {}",
                    lineno_str.bold(),
                    spacing,
                    pipe,
                    prefix,
                    line
                )?;
            }
            let indent = "_".repeat(self.span.end.col + 1).bold().red();
            writeln!(
                out,
                "{}{} {}{}{}",
                full_spacing,
                pipe,
                red_pipe,
                indent,
                "^".bold().red()
            )?;
        }

        for label in self.labels.iter() {
            writeln!(
                out,
                "{}{} {}: {}",
                full_spacing,
                "=".bold(),
                label.span,
                label.msg
            )?;
        }

        if let Some(help) = &self.help {
            writeln!(out, "{}{} {} {}", full_spacing, "=".bold(), "help:".bold(), help)?;
        }

        for note in self.notes.iter() {
            writeln!(out, "{}{} {} {}", full_spacing, "=".bold(), "note:".bold(), note)?;
        }

        writeln!(out)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}] at {}: {}", self.severity, code, self.span, self.msg),
            None => write!(f, "{} at {}: {}", self.severity, self.span, self.msg),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, DiagnosticCode};
    use crate::{
        pathlib::FilePath,
        span::{Pos, Span},
    };

    fn span(lineno: usize, col: usize, len: usize, offset: usize) -> Span {
        Span::new(
            Pos {
                lineno,
                col,
                offset,
            },
            Pos {
                lineno,
                col: col + len,
                offset: offset + len,
            },
        )
    }

    #[test]
    fn renders_location_indicator_help_and_notes() {
        colored::control::set_override(false);
        let src = "fn main() {\n    let x = ;\n}\n";
        let diag = Diagnostic::error("expected an expression, but found `;`", span(1, 12, 1, 24))
            .with_code(DiagnosticCode::UnexpectedToken)
            .with_help("add a value after `=`")
            .with_note("while parsing a let statement");

        let mut out = vec![];
        diag.write_to(&mut out, src, &FilePath::from("main.vr"))
            .expect("rendering to a buffer");
        let text = String::from_utf8(out).expect("utf-8 output");

        assert!(text.starts_with("error[P0001]: expected an expression"), "{}", text);
        assert!(text.contains("--> main.vr:2:13"), "{}", text);
        assert!(text.contains("    let x = ;"), "{}", text);
        assert!(text.contains("            ^"), "{}", text);
        assert!(text.contains("help: add a value after `=`"), "{}", text);
        assert!(text.contains("note: while parsing a let statement"), "{}", text);
    }

    #[test]
    fn display_includes_code_and_position() {
        let diag = Diagnostic::warning("select has no cases", span(0, 0, 6, 0))
            .with_code(DiagnosticCode::EmptySelect);
        assert_eq!(diag.to_string(), "warning[W0001] at 1:1: select has no cases");
        assert!(!diag.is_error());
    }
}
