//! Named acceptance scenarios for the route auditor
//!
//! Each scenario is built as a linked pickup chain, wired exactly the way the
//! monitoring system would hand it over, and paired with the result it must
//! produce. `run_all` is what the `self-check` command executes.

use crate::domain::route::{NodeId, RouteChain, RouteError};
use crate::domain::types::VisitRecord;
use crate::services::route_auditor::{audit, InvalidRouteError, RouteVerdict};

/// What a scenario must produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Total(u64),
    NoCycle,
    Invalid,
}

impl Expectation {
    fn is_met_by(&self, result: &Result<RouteVerdict, InvalidRouteError>) -> bool {
        match (self, result) {
            (Expectation::Total(n), Ok(v)) => v.total_revisit_time() == Some(*n),
            (Expectation::NoCycle, Ok(v)) => v.total_revisit_time().is_none(),
            (Expectation::Invalid, Err(_)) => true,
            _ => false,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Expectation::Total(n) => n.to_string(),
            Expectation::NoCycle => "no cycle".to_string(),
            Expectation::Invalid => "invalid route error".to_string(),
        }
    }
}

/// A chain, the node to start walking from, and the expected result
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub chain: RouteChain,
    pub start: NodeId,
    pub expected: Expectation,
}

impl Scenario {
    pub fn run(&self) -> ScenarioOutcome {
        let result = audit(self.chain.walk(self.start));
        let passed = self.expected.is_met_by(&result);
        let actual = match &result {
            Ok(v) => match v.total_revisit_time() {
                Some(n) => n.to_string(),
                None => "no cycle".to_string(),
            },
            Err(e) => e.to_string(),
        };

        ScenarioOutcome { name: self.name, passed, expected: self.expected.describe(), actual }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Build a chain from `(location, timestamp)` pairs without linking anything
fn nodes(pairs: &[(i64, i64)]) -> (RouteChain, Vec<NodeId>) {
    let mut chain = RouteChain::new();
    let ids = pairs.iter().map(|&p| chain.push(VisitRecord::from(p))).collect();
    (chain, ids)
}

/// Link `ids[a] -> ids[b]` for every `(a, b)` pair
fn wire(chain: &mut RouteChain, ids: &[NodeId], links: &[(usize, usize)]) -> Result<(), RouteError> {
    for &(from, to) in links {
        chain.link(ids[from], ids[to])?;
    }
    Ok(())
}

fn linear(
    name: &'static str,
    pairs: &[(i64, i64)],
    expected: Expectation,
) -> Result<Scenario, RouteError> {
    let (mut chain, ids) = nodes(pairs);
    let links: Vec<_> = (1..ids.len()).map(|i| (i - 1, i)).collect();
    wire(&mut chain, &ids, &links)?;
    Ok(Scenario { name, chain, start: ids[0], expected })
}

/// All named scenarios, in run order
pub fn all() -> Result<Vec<Scenario>, RouteError> {
    let mut scenarios = vec![
        linear(
            "detects_cyclic_ride",
            &[(32144, 1685287960), (12345, 1685288260), (21341, 1685288560), (12345, 1685288860)],
            Expectation::Total(1685288860 - 1685288260),
        )?,
        linear(
            "detects_non_cyclic_ride",
            &[(12237, 1685287960), (32144, 1685288260), (21341, 1685288560), (12345, 1685288860)],
            Expectation::NoCycle,
        )?,
        linear(
            "back_in_time_1",
            &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 3)],
            Expectation::Invalid,
        )?,
    ];

    // Tail points back at the head: a real pointer loop
    let (mut chain, ids) = nodes(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
    wire(&mut chain, &ids, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)])?;
    scenarios.push(Scenario {
        name: "back_in_time_2",
        chain,
        start: ids[0],
        expected: Expectation::Invalid,
    });

    scenarios.push(linear(
        "detects_cyclic_ride_2",
        &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (1, 6)],
        Expectation::Total(5),
    )?);

    // Walk starts at location 1 (t=3); the out-of-order nodes before it and
    // the dangling (1, 6) node are unreachable from there.
    let (mut chain, ids) = nodes(&[(1, 3), (2, 2), (3, 4), (4, 5), (1, 6), (2, 1)]);
    wire(&mut chain, &ids, &[(5, 1), (1, 0), (0, 2), (2, 3), (4, 0)])?;
    scenarios.push(Scenario {
        name: "detects_non_cyclic_ride_2",
        chain,
        start: ids[0],
        expected: Expectation::NoCycle,
    });

    scenarios.push(linear(
        "back_in_time_after_cycle",
        &[(1, 1), (2, 2), (3, 3), (1, 4), (5, 1)],
        Expectation::Invalid,
    )?);

    Ok(scenarios)
}

/// Run every named scenario
pub fn run_all() -> Result<Vec<ScenarioOutcome>, RouteError> {
    Ok(all()?.iter().map(Scenario::run).collect())
}
