//! Route ingestion from JSONL
//!
//! One route per line:
//! `{"route_id": "r-17", "driver": "d-4", "visits": [[12345, 1685288260], ...]}`
//!
//! Visits may also be written as `{"location_id": .., "timestamp": ..}` objects.
//! A line that fails to parse is surfaced as `RouteLine::Malformed` so one bad
//! record does not abort the rest of the batch; only read errors are fatal.

use crate::domain::types::VisitRecord;
use crate::infra::config::STDIO_PATH;
use anyhow::Context;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::{debug, info};

/// A route as submitted by the tracking system
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteInput {
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub driver: Option<String>,
    pub visits: Vec<VisitRecord>,
}

/// One non-blank input line
#[derive(Debug, Clone, PartialEq)]
pub enum RouteLine {
    Route { line_no: usize, route_id: String, driver: Option<String>, visits: Vec<VisitRecord> },
    Malformed { line_no: usize, error: String },
}

impl RouteLine {
    pub fn line_no(&self) -> usize {
        match self {
            RouteLine::Route { line_no, .. } | RouteLine::Malformed { line_no, .. } => *line_no,
        }
    }

    fn parse(line_no: usize, line: &str) -> Self {
        match serde_json::from_str::<RouteInput>(line) {
            Ok(input) => RouteLine::Route {
                line_no,
                // Fall back to the line number so every report row stays traceable
                route_id: input.route_id.unwrap_or_else(|| format!("line-{}", line_no)),
                driver: input.driver,
                visits: input.visits,
            },
            Err(e) => {
                debug!(line_no = %line_no, error = %e, "route_line_malformed");
                RouteLine::Malformed { line_no, error: e.to_string() }
            }
        }
    }
}

/// Streaming JSONL route reader
pub struct RouteReader<R> {
    // Raw bytes so a non-UTF-8 line is reported, not fatal
    lines: io::Split<R>,
    line_no: usize,
}

impl<R: BufRead> RouteReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.split(b'\n'), line_no: 0 }
    }
}

impl RouteReader<Box<dyn BufRead>> {
    /// Open a route file, or stdin for "-"
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let reader: Box<dyn BufRead> = if path == STDIO_PATH {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file =
                File::open(path).with_context(|| format!("Failed to open route file {}", path))?;
            Box::new(BufReader::new(file))
        };

        info!(path = %path, "route_reader_opened");
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> Iterator for RouteReader<R> {
    type Item = io::Result<RouteLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.lines.next()? {
                Ok(raw) => raw,
                Err(e) => return Some(Err(e)),
            };
            self.line_no += 1;

            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    debug!(line_no = %self.line_no, error = %e, "route_line_not_utf8");
                    return Some(Ok(RouteLine::Malformed {
                        line_no: self.line_no,
                        error: format!("line is not valid UTF-8: {}", e),
                    }));
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(Ok(RouteLine::parse(self.line_no, trimmed)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(input: &str) -> Vec<RouteLine> {
        RouteReader::new(Cursor::new(input.to_string())).map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_reads_routes_and_skips_blank_lines() {
        let input = r#"{"route_id": "a", "visits": [[1, 1], [2, 2]]}

{"route_id": "b", "driver": "d-9", "visits": [{"location_id": 3, "timestamp": 7}]}
"#;
        let lines = read_all(input);

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            RouteLine::Route {
                line_no: 1,
                route_id: "a".to_string(),
                driver: None,
                visits: vec![VisitRecord::new(1, 1), VisitRecord::new(2, 2)],
            }
        );
        match &lines[1] {
            RouteLine::Route { line_no, driver, visits, .. } => {
                assert_eq!(*line_no, 3);
                assert_eq!(driver.as_deref(), Some("d-9"));
                assert_eq!(visits, &vec![VisitRecord::new(3, 7)]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_route_id_uses_line_number() {
        let lines = read_all("\n{\"visits\": []}\n");

        match &lines[0] {
            RouteLine::Route { route_id, visits, .. } => {
                assert_eq!(route_id, "line-2");
                assert!(visits.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_line_does_not_stop_reader() {
        let input = "{\"route_id\": \"a\", \"visits\": [[1, 1]]}\nnot json\n{\"route_id\": \"c\", \"visits\": []}\n";
        let lines = read_all(input);

        assert_eq!(lines.len(), 3);
        assert!(matches!(lines[1], RouteLine::Malformed { line_no: 2, .. }));
        assert_eq!(lines[2].line_no(), 3);
    }

    #[test]
    fn test_invalid_utf8_line_is_malformed() {
        let mut input = b"{\"route_id\": \"a\", \"visits\": [[1, 1]]}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"route_id\": \"c\", \"visits\": []}\r\n");

        let lines: Vec<_> = RouteReader::new(Cursor::new(input)).map(|r| r.unwrap()).collect();

        assert_eq!(lines.len(), 3);
        match &lines[1] {
            RouteLine::Malformed { line_no, error } => {
                assert_eq!(*line_no, 2);
                assert!(error.contains("UTF-8"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&lines[2], RouteLine::Route { line_no: 3, route_id, .. } if route_id == "c"));
    }

    #[test]
    fn test_missing_visits_is_malformed() {
        let lines = read_all("{\"route_id\": \"a\"}");
        assert!(matches!(lines[0], RouteLine::Malformed { .. }));
    }

    #[test]
    fn test_open_missing_file() {
        assert!(RouteReader::open("/nonexistent/routes.jsonl").is_err());
    }
}
