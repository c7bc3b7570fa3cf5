use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Headings the generated design document must contain, in this order.
pub const DESIGN_HEADINGS: &[&str] = &[
    "Overview",
    "Goals",
    "Non-Goals",
    "Users & Use Cases",
    "High-Level Architecture",
    "Components",
    "Data Model",
    "API Design",
    "Security & Auth",
    "Deployment",
    "Observability",
    "Milestones",
];

/// Sections every issue body is expected to carry.
pub const BODY_SECTIONS: &[&str] = &["Acceptance Criteria", "Notes"];

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    #[default]
    P2,
}

impl Priority {
    pub fn all() -> &'static [Priority] {
        &[Priority::P0, Priority::P1, Priority::P2]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P0" => Ok(Priority::P0),
            "P1" => Ok(Priority::P1),
            "P2" => Ok(Priority::P2),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Issue / DesignResult
// ---------------------------------------------------------------------------

/// One backlog item. Only built by the schema validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub priority: Priority,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignResult {
    pub design_markdown: String,
    pub issues: Vec<Issue>,
}

impl DesignResult {
    /// Issues sorted by `order`. The sort is stable, so issues sharing an
    /// `order` keep their generated sequence.
    pub fn ordered_issues(&self) -> Vec<&Issue> {
        let mut issues: Vec<&Issue> = self.issues.iter().collect();
        issues.sort_by_key(|i| i.order);
        issues
    }

    /// `order` values used by more than one issue, ascending.
    pub fn duplicate_orders(&self) -> Vec<u32> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.order).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(order, _)| order)
            .collect()
    }

    /// Content conventions that the validator deliberately does not enforce.
    pub fn lint(&self) -> Vec<DesignWarning> {
        let mut warnings = Vec::new();

        let found = markdown_headings(&self.design_markdown);
        let mut cursor = 0;
        for heading in DESIGN_HEADINGS {
            match found[cursor..].iter().position(|h| h == heading) {
                Some(pos) => cursor += pos + 1,
                None if found.iter().any(|h| h == heading) => {
                    warnings.push(DesignWarning::HeadingOutOfOrder(heading.to_string()))
                }
                None => warnings.push(DesignWarning::MissingHeading(heading.to_string())),
            }
        }

        for order in self.duplicate_orders() {
            warnings.push(DesignWarning::DuplicateOrder(order));
        }

        for issue in &self.issues {
            for section in BODY_SECTIONS {
                if !issue.body.contains(section) {
                    warnings.push(DesignWarning::MissingBodySection {
                        order: issue.order,
                        section: section.to_string(),
                    });
                }
            }
        }

        warnings
    }
}

fn markdown_headings(markdown: &str) -> Vec<String> {
    markdown
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("# "))
        .map(|h| h.trim().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// DesignWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignWarning {
    MissingHeading(String),
    HeadingOutOfOrder(String),
    DuplicateOrder(u32),
    MissingBodySection { order: u32, section: String },
}

impl fmt::Display for DesignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignWarning::MissingHeading(h) => write!(f, "design is missing heading '# {h}'"),
            DesignWarning::HeadingOutOfOrder(h) => write!(f, "heading '# {h}' is out of order"),
            DesignWarning::DuplicateOrder(o) => write!(f, "order {o} is used by more than one issue"),
            DesignWarning::MissingBodySection { order, section } => {
                write!(f, "issue #{order} body has no '{section}' section")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
