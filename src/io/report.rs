//! Audit report output
//!
//! Audit results are written in JSONL format (one JSON object per line),
//! either appended to a file or streamed to stdout. Self-check results are
//! printed as `[true] name` / `[false] name` lines.

use crate::infra::config::STDIO_PATH;
use crate::services::route_auditor::{InvalidRouteError, RouteVerdict};
use crate::services::scenarios::ScenarioOutcome;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use crossterm::style::Stylize;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Report status for one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Revisited,
    NoCycle,
    Invalid,
    /// Over the visit budget, never audited
    Rejected,
    /// Could not be parsed
    Malformed,
}

/// One JSONL report record
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub audit_id: String,
    pub route_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    pub line_no: usize,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_revisit_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub visits: usize,
    pub audited_at: String,
}

impl AuditReport {
    fn base(route_id: &str, driver: Option<&str>, line_no: usize, status: ReportStatus) -> Self {
        Self {
            audit_id: Uuid::now_v7().to_string(),
            route_id: route_id.to_string(),
            driver: driver.map(str::to_string),
            line_no,
            status,
            total_revisit_secs: None,
            error_kind: None,
            error: None,
            visits: 0,
            audited_at: rfc3339_now(),
        }
    }

    /// Report for an audited route
    pub fn audited(
        route_id: &str,
        driver: Option<&str>,
        line_no: usize,
        visits: usize,
        result: &Result<RouteVerdict, InvalidRouteError>,
    ) -> Self {
        let status = match result {
            Ok(RouteVerdict::Revisited { .. }) => ReportStatus::Revisited,
            Ok(RouteVerdict::NoCycle) => ReportStatus::NoCycle,
            Err(_) => ReportStatus::Invalid,
        };
        let mut report = Self::base(route_id, driver, line_no, status);
        report.visits = visits;

        match result {
            Ok(verdict) => report.total_revisit_secs = verdict.total_revisit_time(),
            Err(e) => {
                report.error_kind = Some(e.kind());
                report.error = Some(e.to_string());
            }
        }
        report
    }

    pub fn rejected(
        route_id: &str,
        driver: Option<&str>,
        line_no: usize,
        visits: usize,
        max_visits: usize,
    ) -> Self {
        let mut report = Self::base(route_id, driver, line_no, ReportStatus::Rejected);
        report.visits = visits;
        report.error = Some(format!("route has {} visits, limit is {}", visits, max_visits));
        report
    }

    pub fn malformed(line_no: usize, error: &str) -> Self {
        let mut report =
            Self::base(&format!("line-{}", line_no), None, line_no, ReportStatus::Malformed);
        report.error = Some(error.to_string());
        report
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn rfc3339_now() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// JSONL report sink
pub struct ReportWriter {
    target: String,
    out: Box<dyn Write>,
    written: usize,
}

impl ReportWriter {
    /// Open the report target: "-" for stdout, otherwise append to a file
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let out: Box<dyn Write> = if path == STDIO_PATH {
            Box::new(BufWriter::new(io::stdout()))
        } else {
            let file_path = Path::new(path);
            // Create parent directories if they don't exist
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create report directory {}", parent.display())
                    })?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)
                .with_context(|| format!("Failed to open report file {}", path))?;
            Box::new(BufWriter::new(file))
        };

        info!(path = %path, "report_writer_opened");
        Ok(Self { target: path.to_string(), out, written: 0 })
    }

    /// Wrap an arbitrary writer
    pub fn from_writer(out: Box<dyn Write>) -> Self {
        Self { target: "writer".to_string(), out, written: 0 }
    }

    /// Write a report as one line
    pub fn write(&mut self, report: &AuditReport) -> anyhow::Result<()> {
        let json = report.to_json().context("Failed to serialize audit report")?;
        writeln!(self.out, "{}", json)
            .with_context(|| format!("Failed to write report to {}", self.target))?;
        self.written += 1;
        debug!(route_id = %report.route_id, bytes = %json.len(), "report_written");
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.out.flush().with_context(|| format!("Failed to flush report to {}", self.target))
    }
}

/// Color only when configured and the stream is an interactive terminal
pub fn color_enabled<S: IsTerminal>(configured: bool, stream: &S) -> bool {
    configured && stream.is_terminal()
}

/// Print a self-check result line, plus expected/actual on failure
pub fn print_scenario_outcome<W: Write>(
    out: &mut W,
    outcome: &ScenarioOutcome,
    color: bool,
) -> io::Result<()> {
    let line = format!("[{}] {}", outcome.passed, outcome.name);

    match (color, outcome.passed) {
        (true, true) => writeln!(out, "{}", line.as_str().green())?,
        (true, false) => writeln!(out, "{}", line.as_str().red())?,
        (false, _) => writeln!(out, "{}", line)?,
    }

    if !outcome.passed {
        writeln!(out, "Expected: {}", outcome.expected)?;
        writeln!(out, "Got:      {}", outcome.actual)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{LocationId, Timestamp};
    use std::fs;
    use tempfile::tempdir;

    fn repeat_error() -> InvalidRouteError {
        InvalidRouteError::NonAdvancingRepeat {
            position: 2,
            location_id: LocationId(1),
            timestamp: Timestamp(5),
            previous: Timestamp(5),
        }
    }

    #[test]
    fn test_audited_revisited_report() {
        let report = AuditReport::audited(
            "r1",
            Some("d1"),
            1,
            4,
            &Ok(RouteVerdict::Revisited { total_revisit_secs: 600 }),
        );

        let parsed: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed["route_id"], "r1");
        assert_eq!(parsed["driver"], "d1");
        assert_eq!(parsed["status"], "revisited");
        assert_eq!(parsed["total_revisit_secs"], 600);
        assert_eq!(parsed["visits"], 4);
        assert!(parsed.get("error").is_none());
        assert!(!report.audit_id.is_empty());
    }

    #[test]
    fn test_no_cycle_report_omits_total() {
        let report = AuditReport::audited("r2", None, 3, 2, &Ok(RouteVerdict::NoCycle));

        let parsed: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed["status"], "no_cycle");
        assert!(parsed.get("total_revisit_secs").is_none());
        assert!(parsed.get("driver").is_none());
    }

    #[test]
    fn test_invalid_report_carries_kind_and_message() {
        let report = AuditReport::audited("r3", None, 1, 3, &Err(repeat_error()));

        assert_eq!(report.status, ReportStatus::Invalid);
        assert_eq!(report.error_kind, Some("non_advancing_repeat"));
        assert!(report.error.as_deref().unwrap().contains("non-advancing"));
    }

    #[test]
    fn test_rejected_and_malformed_reports() {
        let rejected = AuditReport::rejected("big", None, 7, 1200, 1000);
        assert_eq!(rejected.status, ReportStatus::Rejected);
        assert_eq!(rejected.error.as_deref(), Some("route has 1200 visits, limit is 1000"));

        let malformed = AuditReport::malformed(9, "expected value");
        assert_eq!(malformed.route_id, "line-9");
        assert_eq!(malformed.status, ReportStatus::Malformed);
    }

    #[test]
    fn test_audit_ids_unique() {
        let a = AuditReport::audited("r", None, 1, 0, &Ok(RouteVerdict::NoCycle));
        let b = AuditReport::audited("r", None, 1, 0, &Ok(RouteVerdict::NoCycle));
        assert_ne!(a.audit_id, b.audit_id);
    }

    #[test]
    fn test_writer_appends_jsonl_and_creates_dirs() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nested").join("report.jsonl");
        let file_str = file_path.to_str().unwrap();

        let mut writer = ReportWriter::open(file_str).unwrap();
        writer.write(&AuditReport::audited("r1", None, 1, 2, &Ok(RouteVerdict::NoCycle))).unwrap();
        writer.write(&AuditReport::malformed(2, "bad")).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.written(), 2);
        drop(writer);

        let mut writer = ReportWriter::open(file_str).unwrap();
        writer.write(&AuditReport::malformed(3, "bad")).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let content = fs::read_to_string(&file_path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }
    }

    #[test]
    fn test_color_disabled_for_non_terminal() {
        let file = tempfile::tempfile().unwrap();

        assert!(!color_enabled(true, &file));
        assert!(!color_enabled(false, &file));
    }

    #[test]
    fn test_print_scenario_outcome_plain() {
        let passed = ScenarioOutcome {
            name: "detects_cyclic_ride",
            passed: true,
            expected: "600".to_string(),
            actual: "600".to_string(),
        };
        let failed = ScenarioOutcome {
            name: "back_in_time_1",
            passed: false,
            expected: "invalid route error".to_string(),
            actual: "no cycle".to_string(),
        };

        let mut out = Vec::new();
        print_scenario_outcome(&mut out, &passed, false).unwrap();
        print_scenario_outcome(&mut out, &failed, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "[true] detects_cyclic_ride\n[false] back_in_time_1\nExpected: invalid route error\nGot:      no cycle\n"
        );
    }

    #[test]
    fn test_print_scenario_outcome_colored() {
        let outcome = ScenarioOutcome {
            name: "x",
            passed: true,
            expected: String::new(),
            actual: String::new(),
        };

        let mut out = Vec::new();
        print_scenario_outcome(&mut out, &outcome, true).unwrap();

        let text = String::from_utf8(out).unwrap();
        // Escape codes are omitted when NO_COLOR is set, so only check the text
        assert!(text.contains("[true] x"));
    }
}
