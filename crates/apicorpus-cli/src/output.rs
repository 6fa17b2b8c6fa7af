//! Everything written to stdout.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use apicorpus_core::pipeline::{DocumentReport, FailureReport, RunOutcome};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn print_line(line: &str) {
    println!("{line}");
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

/// Spinner on stderr; hidden in JSON mode.
pub fn spinner() -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Failure dumps followed by a one-line summary, or the whole outcome as JSON.
pub fn print_outcome(outcome: &RunOutcome) -> anyhow::Result<()> {
    if is_json() {
        return print(outcome);
    }
    let mut out = stdout();
    for failure in outcome.failures() {
        write_failure(&mut out, failure)?;
    }
    for report in &outcome.reports {
        if let DocumentReport::Persisted { location, .. } = report {
            writeln!(out, "wrote {location}")?;
        }
    }
    writeln!(
        out,
        "{} succeeded, {} failed",
        outcome.succeeded(),
        outcome.failures().count()
    )?;
    Ok(())
}

fn banner<W: WriteColor>(out: &mut W, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    writeln!(out, "{text}")?;
    out.reset()
}

fn section<W: WriteColor>(out: &mut W, title: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
    writeln!(out, "---- {title} ----")?;
    out.reset()
}

/// Structured dump of one failed document between delimiter banners.
pub fn write_failure<W: WriteColor>(out: &mut W, f: &FailureReport) -> anyhow::Result<()> {
    banner(out, &format!("==== FAILED [{}] {} ({}) ====", f.stage.as_str(), f.source_url, f.format))?;
    section(out, "errors")?;
    for e in &f.errors {
        writeln!(out, "  - {e}")?;
    }
    if !f.warnings.is_empty() {
        section(out, "warnings")?;
        for w in &f.warnings {
            writeln!(out, "  - {w}")?;
        }
    }
    if let Some(source) = &f.source {
        section(out, "source")?;
        writeln!(out, "{}", serde_json::to_string_pretty(source)?)?;
    }
    if let Some(partial) = &f.partial {
        section(out, "partial")?;
        writeln!(out, "{}", serde_json::to_string_pretty(partial)?)?;
    }
    banner(out, "==== END ====")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicorpus_core::pipeline::StageId;
    use apicorpus_core::CorpusError;
    use serde_json::json;
    use termcolor::NoColor;

    #[test]
    fn failure_dump_is_bracketed() {
        let err = CorpusError::Validation(vec!["info.title is missing".into()]);
        let report = FailureReport::new("https://a/x.json", "swagger_2", StageId::Validate, &err)
            .with_source(Some(json!({"swagger": "2.0"})))
            .with_warnings(vec!["info.description is missing".into()]);

        let mut buf = NoColor::new(Vec::new());
        write_failure(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf.into_inner()).unwrap();

        assert!(text.starts_with("==== FAILED [validate] https://a/x.json (swagger_2) ====\n"));
        assert!(text.contains("  - info.title is missing\n"));
        assert!(text.contains("---- warnings ----\n"));
        assert!(text.contains("---- source ----\n"));
        assert!(!text.contains("---- partial ----"));
        assert!(text.ends_with("==== END ====\n"));
    }
}
