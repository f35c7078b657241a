//! Plain-text report.

use std::io::{self, Write};

use super::Report;
use crate::check::{CheckResult, CheckType, Outcome};
use crate::error::{ReviewError, Result};

/// Column the report wraps at.
pub const WIDTH: usize = 78;

/// Continuation indent of wrapped result lines.
pub const INDENT: &str = "     ";

/// Greedy word wrap. Words longer than the width get a line of their own.
pub fn wrap(text: &str, width: usize, initial: &str, subsequent: &str) -> String {
    let mut lines = Vec::new();
    let mut line = initial.to_string();
    let mut has_word = false;
    for word in text.split_whitespace() {
        if has_word && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::replace(&mut line, subsequent.to_string()));
            has_word = false;
        }
        if has_word {
            line.push(' ');
        }
        line.push_str(word);
        has_word = true;
    }
    lines.push(line);
    lines.join("\n")
}

fn result_lines(result: &CheckResult) -> String {
    let mut out = wrap(
        &result.text,
        WIDTH,
        &format!("{}: ", result.state.glyph()),
        INDENT,
    );
    if let Some(note) = &result.note {
        out.push('\n');
        out.push_str(&wrap(note, WIDTH, &format!("{}Note: ", INDENT), INDENT));
    }
    out
}

fn heading<W: Write>(writer: &mut W, title: &str, underline: char) -> io::Result<()> {
    writeln!(writer, "{}", title)?;
    writeln!(writer, "{}", underline.to_string().repeat(title.chars().count()))
}

/// Write the report as text.
pub fn write_text<W: Write>(report: &Report<'_>, writer: &mut W) -> io::Result<()> {
    heading(writer, "Package Review", '=')?;
    writeln!(writer)?;
    writeln!(writer, "Package: {}", report.package.nvr)?;
    writeln!(
        writer,
        "Generated: {}",
        report.generated.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    let summary = &report.summary;
    writeln!(
        writer,
        "Checks: {} passed, {} failed, {} pending, {} not applicable",
        summary.passed, summary.failed, summary.pending, summary.not_applicable
    )?;
    writeln!(writer)?;
    writeln!(writer, "Legend:")?;
    writeln!(
        writer,
        "{} = Pass, {} = Fail, {} = Not applicable, {} = Manual review needed",
        Outcome::Pass.glyph(),
        Outcome::Fail.glyph(),
        Outcome::NotApplicable.glyph(),
        Outcome::Pending.glyph()
    )?;

    let issues: Vec<&CheckResult> = report.issues().collect();
    if !issues.is_empty() {
        writeln!(writer)?;
        heading(writer, "Issues:", '=')?;
        for issue in issues {
            writeln!(writer, "{}", wrap(&issue.text, WIDTH, "- ", "  "))?;
            if let Some(note) = &issue.note {
                writeln!(writer, "{}", wrap(note, WIDTH, "  Note: ", "  "))?;
            }
            writeln!(writer, "  See: {}", issue.url)?;
        }
    }

    for (group, results) in &report.groups {
        writeln!(writer)?;
        writeln!(writer, "===== {} =====", group)?;
        let mut current: Option<CheckType> = None;
        for result in results {
            if current != Some(result.check_type) {
                current = Some(result.check_type);
                writeln!(writer)?;
                writeln!(writer, "{} items:", result.check_type)?;
            }
            writeln!(writer, "{}", result_lines(result))?;
        }
    }

    let attachments: Vec<_> = report.results().flat_map(|r| r.attachments.iter()).collect();
    if !attachments.is_empty() {
        writeln!(writer)?;
        writeln!(writer)?;
        for attachment in attachments {
            writeln!(writer, "{}", attachment.to_string().trim_end())?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Render the report as a text string.
pub fn render_text(report: &Report<'_>) -> Result<String> {
    let mut buf = Vec::new();
    write_text(report, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ReviewError::Other(e.into()))
}
