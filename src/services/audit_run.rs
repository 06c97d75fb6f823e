//! Batch audit loop: read routes, enforce the visit budget, audit, report

use crate::infra::config::Config;
use crate::infra::metrics::{AuditMetrics, MetricsSummary};
use crate::io::report::{AuditReport, ReportWriter};
use crate::io::route_reader::RouteLine;
use crate::services::route_auditor::RouteAuditor;
use anyhow::Context;
use std::io;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Audit every route from `lines`, writing one report per line.
///
/// Invalid, rejected and malformed routes are results, not failures; only
/// read or write errors abort the run.
pub fn run_batch<I>(
    lines: I,
    writer: &mut ReportWriter,
    config: &Config,
    metrics: Arc<AuditMetrics>,
) -> anyhow::Result<MetricsSummary>
where
    I: IntoIterator<Item = io::Result<RouteLine>>,
{
    let auditor = RouteAuditor::with_metrics(metrics.clone());
    let max_visits = config.max_visits_per_route();
    let summary_every = config.summary_every();

    for line in lines {
        let line = line.context("Failed to read route input")?;
        debug!(line_no = %line.line_no(), "route_line_read");

        let report = match line {
            RouteLine::Route { line_no, route_id, driver, visits } => {
                let visit_count = visits.len();
                if max_visits > 0 && visit_count > max_visits {
                    warn!(
                        route_id = %route_id,
                        visits = %visit_count,
                        max_visits = %max_visits,
                        "route_over_budget"
                    );
                    metrics.record_rejected();
                    AuditReport::rejected(
                        &route_id,
                        driver.as_deref(),
                        line_no,
                        visit_count,
                        max_visits,
                    )
                } else {
                    let result = auditor.audit(&route_id, visits);
                    if summary_every > 0 && metrics.routes_audited() % summary_every == 0 {
                        metrics.snapshot().log();
                    }
                    AuditReport::audited(&route_id, driver.as_deref(), line_no, visit_count, &result)
                }
            }
            RouteLine::Malformed { line_no, error } => {
                warn!(line_no = %line_no, error = %error, "route_line_skipped");
                metrics.record_malformed();
                AuditReport::malformed(line_no, &error)
            }
        };

        writer.write(&report)?;
    }

    writer.flush()?;

    let summary = metrics.snapshot();
    info!(reports = %writer.written(), invalid = %summary.invalid(), "audit_run_complete");
    Ok(summary)
}
