use colored::*;

use crate::{
  diagnostic::{Diagnostic, LabelStyle},
  error_kind::Severity,
};

/// Formats a diagnostic like rustc does, using the `colored` crate.
pub struct DiagnosticFormatter<'a> {
  diagnostic: &'a Diagnostic,
  source: &'a str,
}

impl<'a> DiagnosticFormatter<'a> {
  pub fn new(diagnostic: &'a Diagnostic, source: &'a str) -> Self {
    Self { diagnostic, source }
  }

  fn severity_text(&self) -> &'static str {
    match self.diagnostic.severity {
      Severity::Error => "error",
      Severity::Warning => "warning",
      Severity::Note => "note",
      Severity::Help => "help",
    }
  }

  fn underline_char(&self, style: LabelStyle) -> char {
    match style {
      LabelStyle::Primary => '^',
      LabelStyle::Secondary => '-',
    }
  }

  pub fn format(&self) -> String {
    let mut output = String::new();

    let header = format!(
      "{}: [{}]: {}",
      self.severity_text().red().bold(),
      self.diagnostic.kind.code().red().bold(),
      self.diagnostic.message
    );
    output.push_str(&header);
    output.push('\n');

    for label in &self.diagnostic.labels {
      output.push_str(&format!(
        "  {} input:{}:{}\n",
        "-->".blue().bold(),
        label.span.line.to_string().white().bold(),
        label.span.column.to_string().white().bold()
      ));
      output.push_str(&format!("   {}\n", "|".blue().bold()));
      output.push_str(&format!("   {} {}\n", "|".blue().bold(), self.source));

      let underline_char = self.underline_char(label.style);
      let padding = " ".repeat(label.span.column);
      let underline = underline_char.to_string().repeat(label.span.length.max(1));
      output.push_str(&format!(
        "   {} {}{}\n",
        "|".blue().bold(),
        padding,
        underline.red().bold()
      ));

      if let Some(msg) = &label.message {
        output.push_str(&format!("   {} {}{}\n", "|".blue().bold(), padding, msg.red().bold()));
      }
    }

    for note in &self.diagnostic.notes {
      output.push_str(&format!("   {} {}: {}\n", "=".blue().bold(), "note".cyan().bold(), note));
    }

    if let Some(help) = &self.diagnostic.help {
      output.push_str(&format!("   {} {}: {}\n", "=".blue().bold(), "help".cyan().bold(), help));
    }

    output
  }

  /// Format without colors, for logging to a file or asserting in tests.
  pub fn format_plain(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!(
      "{}: [{}]: {}\n",
      self.severity_text(),
      self.diagnostic.kind.code(),
      self.diagnostic.message
    ));

    for label in &self.diagnostic.labels {
      output.push_str(&format!("  --> input:{}:{}\n", label.span.line, label.span.column));
      output.push_str("   |\n");
      output.push_str(&format!("   | {}\n", self.source));

      let underline_char = self.underline_char(label.style);
      let padding = " ".repeat(label.span.column);
      let underline = underline_char.to_string().repeat(label.span.length.max(1));
      output.push_str(&format!("   | {}{}\n", padding, underline));

      if let Some(msg) = &label.message {
        output.push_str(&format!("   | {}{}\n", padding, msg));
      }
    }

    for note in &self.diagnostic.notes {
      output.push_str(&format!("   = note: {}\n", note));
    }

    if let Some(help) = &self.diagnostic.help {
      output.push_str(&format!("   = help: {}\n", help));
    }

    output
  }
}
