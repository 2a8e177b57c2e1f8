//! Terminal reporting
//!
//! Renders the assertion ledger as a check-by-check report with a
//! trailing summary, and raw SOAP XML as an indented, syntax-highlighted
//! listing. Color is an option of the reporter, not of the data: the
//! same classified spans render plain when color is off.

use colored::Colorize;
use libris_domain::{xml, Ledger, RunSummary, XmlLine, XmlSpan, XmlSpanKind};

/// Renders ledgers and XML for the terminal.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
}

impl Reporter {
    /// Creates a reporter; `color` controls ANSI styling.
    #[must_use]
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    /// Renders the full ledger: one line per record, then the summary.
    #[must_use]
    pub fn render(&self, ledger: &Ledger) -> String {
        let mut out = String::new();
        for record in ledger.records() {
            if record.passed {
                let mark = self.paint("\u{2713} PASS", Paint::Pass);
                out.push_str(&format!(
                    "{mark}  {}  ({})\n",
                    record.step, record.actual
                ));
            } else {
                let mark = self.paint("\u{2717} FAIL", Paint::Fail);
                out.push_str(&format!(
                    "{mark}  {}  expected {}, got {}\n",
                    record.step, record.expected, record.actual
                ));
            }
        }
        out.push_str(&self.render_summary(&ledger.summary()));
        out
    }

    /// Renders the run totals and the verdict line.
    #[must_use]
    pub fn render_summary(&self, summary: &RunSummary) -> String {
        let verdict = if summary.all_passed() {
            self.paint("ALL CHECKS PASSED", Paint::Pass)
        } else {
            self.paint("SOME CHECKS FAILED", Paint::Fail)
        };
        format!(
            "{}\nTotal: {}  Passed: {}  Failed: {}\n{verdict}\n",
            "=".repeat(48),
            summary.total,
            summary.passed,
            summary.failed,
        )
    }

    /// Pretty-prints an XML document with two-space indentation and
    /// per-span highlighting. Input that does not parse is returned
    /// unchanged.
    #[must_use]
    pub fn render_xml(&self, raw_xml: &str) -> String {
        xml::tokenize(raw_xml).map_or_else(
            || raw_xml.to_string(),
            |lines| {
                lines
                    .iter()
                    .map(|line| self.render_line(line))
                    .collect::<Vec<_>>()
                    .join("\n")
            },
        )
    }

    fn render_line(&self, line: &XmlLine) -> String {
        let body: String = line.spans.iter().map(|s| self.render_span(s)).collect();
        format!("{}{body}", "  ".repeat(line.depth))
    }

    fn render_span(&self, span: &XmlSpan) -> String {
        if !self.color {
            return span.text.clone();
        }
        let text = span.text.as_str();
        match span.kind {
            XmlSpanKind::Markup => text.cyan().to_string(),
            XmlSpanKind::TagName => text.yellow().to_string(),
            XmlSpanKind::Attribute => text.magenta().to_string(),
            XmlSpanKind::AttrValue | XmlSpanKind::BoolTrue => text.green().to_string(),
            XmlSpanKind::Text => text.to_string(),
            XmlSpanKind::BoolFalse => text.red().to_string(),
            XmlSpanKind::StatusActive => text.bright_yellow().to_string(),
            XmlSpanKind::StatusReturned => text.blue().to_string(),
        }
    }

    fn paint(&self, text: &str, paint: Paint) -> String {
        if !self.color {
            return text.to_string();
        }
        match paint {
            Paint::Pass => text.green().bold().to_string(),
            Paint::Fail => text.red().bold().to_string(),
        }
    }
}

enum Paint {
    Pass,
    Fail,
}
