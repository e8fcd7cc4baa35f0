use std::fmt;
use std::str::FromStr;

/// Cache title of the fast-path report.
pub const FAILURE_IDENTIFICATION_TITLE: &str = "Failure Identification";
/// Cache title shared by every generated report.
pub const RELIABILITY_REPORT_TITLE: &str = "AI Reliability Report";

/// Report artifact the user can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Deterministic failure listing served by the fast endpoint.
    IdentifyFailures,
    RootCause,
    Impact,
    Fix,
    /// Any other generated report type, passed through verbatim.
    Other(String),
}

impl ReportKind {
    pub fn is_fast_path(&self) -> bool {
        matches!(self, ReportKind::IdentifyFailures)
    }

    /// Value of the `type` query parameter, `None` for the fast path.
    pub fn query_type(&self) -> Option<&str> {
        match self {
            ReportKind::IdentifyFailures => None,
            ReportKind::RootCause => Some("why"),
            ReportKind::Impact => Some("impact"),
            ReportKind::Fix => Some("fix"),
            ReportKind::Other(kind) => Some(kind.as_str()),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.is_fast_path() {
            FAILURE_IDENTIFICATION_TITLE
        } else {
            RELIABILITY_REPORT_TITLE
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::IdentifyFailures => write!(f, "identify-failures"),
            ReportKind::RootCause => write!(f, "root-cause"),
            ReportKind::Impact => write!(f, "impact"),
            ReportKind::Fix => write!(f, "fix"),
            ReportKind::Other(kind) => write!(f, "{kind}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReportKindError;

impl fmt::Display for ParseReportKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "report kind must not be empty")
    }
}

impl std::error::Error for ParseReportKindError {}

impl FromStr for ReportKind {
    type Err = ParseReportKindError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseReportKindError);
        }
        let kind = match trimmed.to_ascii_lowercase().as_str() {
            "identify-failures" | "identify" | "what" => ReportKind::IdentifyFailures,
            "root-cause" | "why" => ReportKind::RootCause,
            "impact" => ReportKind::Impact,
            "fix" | "repair" => ReportKind::Fix,
            _ => ReportKind::Other(trimmed.to_string()),
        };
        Ok(kind)
    }
}
