//! Traceability report module - the output contract of an analysis
//!
//! The report links requirements to the code regions that implement them,
//! records a verdict per test case, and carries a fix suggestion for each
//! failing test case. Code regions are free-form strings: route names,
//! function names or line references, whatever the model reported.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of checking one test case against the code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The code satisfies the test case
    #[serde(alias = "pass", alias = "PASS")]
    Pass,
    /// The code does not satisfy the test case
    #[serde(alias = "fail", alias = "FAIL")]
    Fail,
}

impl Verdict {
    /// Whether this verdict is a failure
    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "Pass"),
            Verdict::Fail => write!(f, "Fail"),
        }
    }
}

/// Suggested fix for a failing test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recommendation {
    /// What is wrong in the code
    pub issue: String,

    /// Requirement identifier the failure violates
    pub affected_requirement: String,

    /// Proposed change
    pub solution: String,
}

/// Structured traceability result for one request
///
/// Maps are ordered so the serialized report is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceabilityReport {
    /// Test-case identifier → verdict
    pub test_case_analysis: BTreeMap<String, Verdict>,

    /// Requirement identifier → ordered code-region identifiers
    pub code_traceability: BTreeMap<String, Vec<String>>,

    /// Failing test-case identifier → recommendation
    pub recommendations: BTreeMap<String, Recommendation>,
}

/// A violation of the cross-section invariants of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    /// A test case is marked `Fail` but has no recommendation
    FailWithoutRecommendation {
        /// Test-case identifier
        test_case: String,
    },
    /// A recommendation names a requirement missing from `code_traceability`
    UntracedRequirement {
        /// Test-case identifier of the recommendation
        test_case: String,
        /// The requirement that has no traceability entry
        requirement: String,
    },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyIssue::FailWithoutRecommendation { test_case } => {
                write!(f, "test case {} failed but has no recommendation", test_case)
            }
            ConsistencyIssue::UntracedRequirement { test_case, requirement } => write!(
                f,
                "recommendation for {} names requirement {} which is not traced to code",
                test_case, requirement
            ),
        }
    }
}

impl TraceabilityReport {
    /// Identifiers of all test cases marked `Fail`, in key order
    pub fn failing_test_cases(&self) -> Vec<&str> {
        self.test_case_analysis
            .iter()
            .filter(|(_, verdict)| verdict.is_fail())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Check the report's cross-section invariants
    ///
    /// Every failing test case should have a recommendation, and every
    /// recommendation should point at a requirement present in
    /// `code_traceability`. An empty result means the report is consistent.
    pub fn consistency_issues(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        for test_case in self.failing_test_cases() {
            if !self.recommendations.contains_key(test_case) {
                issues.push(ConsistencyIssue::FailWithoutRecommendation {
                    test_case: test_case.to_string(),
                });
            }
        }

        for (test_case, recommendation) in &self.recommendations {
            if !self.code_traceability.contains_key(&recommendation.affected_requirement) {
                issues.push(ConsistencyIssue::UntracedRequirement {
                    test_case: test_case.clone(),
                    requirement: recommendation.affected_requirement.clone(),
                });
            }
        }

        issues
    }
}
