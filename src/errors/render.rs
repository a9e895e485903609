// src/errors/render.rs
//! Rendering utilities for miette diagnostics.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, ThemeCharacters, ThemeStyles};
use std::io::Write as IoWrite;

/// Create a handler for terminal output (unicode + colors).
pub fn terminal_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::unicode(),
        styles: ThemeStyles::ansi(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Create a handler for snapshot testing (ascii + no colors).
pub fn snapshot_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Render to stderr with unicode/colors.
pub fn render_to_stderr(report: &dyn Diagnostic) {
    let handler = terminal_handler();
    let mut output = String::new();
    if handler.render_report(&mut output, report).is_ok() {
        eprint!("{}", output);
    }
}

/// Render to a buffer without colors (for snapshots/testing).
pub fn render_to_string(report: &dyn Diagnostic) -> String {
    let mut output = String::new();
    let handler = snapshot_handler();
    let _ = handler.render_report(&mut output, report);
    output
}

/// Render to any Write impl.
pub fn render_to_writer<W: IoWrite>(report: &dyn Diagnostic, mut writer: W) -> std::io::Result<()> {
    let output = render_to_string(report);
    writer.write_all(output.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SemanticError;
    use miette::NamedSource;

    #[test]
    fn render_semantic_error_to_string() {
        let err = SemanticError::UndefinedSymbol {
            name: "foo".to_string(),
            span: (8, 3).into(),
        };
        let report = miette::Report::new(err)
            .with_source_code(NamedSource::new("test.janus", "let x = foo".to_string()));

        let output = render_to_string(report.as_ref());
        assert!(output.contains("E2002"), "should contain error code");
        assert!(
            output.contains("undefined symbol"),
            "should contain message"
        );
        assert!(output.contains("foo"), "should contain the name");
    }

    #[test]
    fn render_with_help() {
        let err = SemanticError::AmbiguousInference {
            span: (0, 5).into(),
        };
        let report = miette::Report::new(err)
            .with_source_code(NamedSource::new("test.janus", "let x".to_string()));

        let output = render_to_string(report.as_ref());
        assert!(output.contains("E2004"), "should contain error code");
        assert!(output.contains("help"), "should contain help text");
    }
}
