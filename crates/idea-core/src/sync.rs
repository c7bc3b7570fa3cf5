//! Repository and backlog synchronization.
//!
//! A run walks a fixed sequence of states:
//!
//! ```text
//! ResolveRepo ─┬─> Created ──────────────────────┬─> CreateIssues ─> Done
//!              └─> Found ─> ReconcileIssues ─────┘
//!   (any fatal error) ─> Aborted
//! ```
//!
//! Only repository resolution can abort. Once the repository is known,
//! every close or create failure is recorded against its item and the run
//! keeps going.

use crate::config::{GithubConfig, ReconcileScope, DEFAULT_MARKER_LABEL};
use crate::design::{DesignResult, Issue};
use crate::error::{SyncError, TrackerError};
use crate::tracker::{IssueFilter, IssueTracker, NewIssue, NewRepo, RepoCreation, RepoRef};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    ResolveRepo,
    Created,
    Found,
    ReconcileIssues,
    CreateIssues,
    Done,
    Aborted,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncState::ResolveRepo => "resolve_repo",
            SyncState::Created => "created",
            SyncState::Found => "found",
            SyncState::ReconcileIssues => "reconcile_issues",
            SyncState::CreateIssues => "create_issues",
            SyncState::Done => "done",
            SyncState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// How the target repository was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoResolution {
    Created,
    Found,
}

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Cooperative cancellation, checked between remote calls.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// The unit a non-fatal failure or skip is recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemRef {
    /// Listing the repository's open issues.
    Listing,
    /// A pre-existing remote issue.
    Existing { number: u64, title: String },
    /// A backlog item from the design.
    Backlog { order: u32, title: String },
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Listing => f.write_str("open issue listing"),
            ItemRef::Existing { number, title } => write!(f, "#{number} {title}"),
            ItemRef::Backlog { order, title } => write!(f, "[{order}] {title}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: ItemRef,
    pub status: Option<u16>,
    pub message: String,
}

impl ItemFailure {
    fn new(item: ItemRef, error: &TrackerError) -> Self {
        Self {
            item,
            status: error.status(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedIssue {
    pub order: u32,
    pub number: u64,
    pub title: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub repo: RepoRef,
    pub resolution: RepoResolution,
    pub trace: Vec<SyncState>,
    pub closed: Vec<u64>,
    pub close_failures: Vec<ItemFailure>,
    pub created: Vec<CreatedIssue>,
    pub failures: Vec<ItemFailure>,
    pub skipped: Vec<ItemRef>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Creation failures or skipped backlog items make a run partial.
    /// Close failures are reported but do not.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }
}

#[derive(Debug)]
pub struct SyncAbort {
    pub at: SyncState,
    pub error: SyncError,
    pub trace: Vec<SyncState>,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Success(SyncReport),
    PartialSuccess(SyncReport),
    Aborted(SyncAbort),
}

impl SyncOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncOutcome::Success(r) | SyncOutcome::PartialSuccess(r) => Some(r),
            SyncOutcome::Aborted(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Success(_) => "success",
            SyncOutcome::PartialSuccess(_) => "partial_success",
            SyncOutcome::Aborted(_) => "aborted",
        }
    }

    /// Process exit code for this outcome: 0, 2 for partial, 1 for aborted.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncOutcome::Success(_) => 0,
            SyncOutcome::PartialSuccess(_) => 2,
            SyncOutcome::Aborted(_) => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload shaping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub marker_label: String,
    pub reconcile: ReconcileScope,
    pub private: bool,
    pub priority_labels: bool,
}

impl From<&GithubConfig> for SyncOptions {
    fn from(config: &GithubConfig) -> Self {
        Self {
            marker_label: config.marker_label.clone(),
            reconcile: config.reconcile,
            private: config.private,
            priority_labels: config.priority_labels,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&GithubConfig::default())
    }
}

impl SyncOptions {
    /// The label stamped on created issues. A blank setting falls back to
    /// the default so managed reconciliation can still find them.
    fn marker(&self) -> &str {
        match self.marker_label.trim() {
            "" => DEFAULT_MARKER_LABEL,
            label => label,
        }
    }

    fn reconcile_filter(&self) -> IssueFilter {
        match self.reconcile {
            ReconcileScope::Managed => IssueFilter::Label(self.marker().to_string()),
            ReconcileScope::All => IssueFilter::All,
        }
    }

    /// The remote payload for one backlog item. Order and priority travel in
    /// the body; labels gain the marker and, if enabled, `priority:Pn`.
    pub fn issue_payload(&self, issue: &Issue) -> NewIssue {
        let mut labels = issue.labels.clone();
        let mut push = |label: String| {
            if !labels.contains(&label) {
                labels.push(label);
            }
        };
        if self.priority_labels {
            push(format!("priority:{}", issue.priority));
        }
        push(self.marker().to_string());

        let body = format!(
            "{}\n\n---\nBacklog order: {}\nPriority: {}\n",
            issue.body.trim_end(),
            issue.order,
            issue.priority
        );

        NewIssue {
            title: issue.title.clone(),
            body,
            labels,
        }
    }
}

/// Description used for a repository created from an idea.
pub fn repo_description(idea: &str) -> String {
    format!("Repository for: {}", idea.trim())
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

pub struct SyncEngine<'a> {
    tracker: &'a dyn IssueTracker,
    options: SyncOptions,
    cancel: CancelToken,
}

impl<'a> SyncEngine<'a> {
    pub fn new(tracker: &'a dyn IssueTracker, options: SyncOptions) -> Self {
        Self {
            tracker,
            options,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Push `design` into the repository `name` owned by the authenticated
    /// identity, creating the repository if needed.
    pub fn run(&self, name: &str, description: &str, design: &DesignResult) -> SyncOutcome {
        let started_at = Utc::now();
        let mut trace = vec![SyncState::ResolveRepo];

        let (repo, resolution) = match self.resolve_repo(name, description) {
            Ok(resolved) => resolved,
            Err(error) => {
                tracing::error!(state = %SyncState::ResolveRepo, error = %error, "sync aborted");
                trace.push(SyncState::Aborted);
                return SyncOutcome::Aborted(SyncAbort {
                    at: SyncState::ResolveRepo,
                    error,
                    trace,
                });
            }
        };

        let mut report = SyncReport {
            repo,
            resolution,
            trace,
            closed: Vec::new(),
            close_failures: Vec::new(),
            created: Vec::new(),
            failures: Vec::new(),
            skipped: Vec::new(),
            cancelled: false,
            started_at,
            finished_at: started_at,
        };

        match resolution {
            RepoResolution::Created => report.trace.push(SyncState::Created),
            RepoResolution::Found => {
                report.trace.push(SyncState::Found);
                report.trace.push(SyncState::ReconcileIssues);
                self.reconcile(&mut report);
            }
        }

        report.trace.push(SyncState::CreateIssues);
        self.create_issues(design, &mut report);

        report.trace.push(SyncState::Done);
        report.cancelled = self.cancel.is_cancelled();
        report.finished_at = Utc::now();

        tracing::info!(
            repo = %report.repo,
            closed = report.closed.len(),
            created = report.created.len(),
            failed = report.failures.len(),
            skipped = report.skipped.len(),
            "sync finished"
        );

        if report.is_complete() {
            SyncOutcome::Success(report)
        } else {
            SyncOutcome::PartialSuccess(report)
        }
    }

    fn resolve_repo(&self, name: &str, description: &str) -> Result<(RepoRef, RepoResolution), SyncError> {
        if name.is_empty() {
            return Err(SyncError::InvalidRepoName(name.to_string()));
        }

        let owner = self.tracker.current_login().map_err(SyncError::Identity)?;
        let repo = RepoRef::new(owner, name);
        let request = NewRepo {
            name: name.to_string(),
            description: description.to_string(),
            private: self.options.private,
        };

        match self.tracker.create_repo(&request) {
            Ok(RepoCreation::Created) => {
                tracing::info!(repo = %repo, "repository created");
                Ok((repo, RepoResolution::Created))
            }
            Ok(RepoCreation::NameTaken) => {
                tracing::info!(repo = %repo, "repository name taken; checking for an existing repository");
                match self.tracker.get_repo(&repo) {
                    Ok(()) => {
                        tracing::info!(repo = %repo, "using existing repository");
                        Ok((repo, RepoResolution::Found))
                    }
                    Err(source) => Err(SyncError::UnexplainedConflict {
                        owner: repo.owner,
                        name: repo.name,
                        source,
                    }),
                }
            }
            Err(source) => Err(SyncError::CreateRepo {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn reconcile(&self, report: &mut SyncReport) {
        let filter = self.options.reconcile_filter();
        let open = match self.tracker.list_open_issues(&report.repo, &filter) {
            Ok(open) => open,
            Err(e) => {
                tracing::warn!(repo = %report.repo, error = %e, "failed to list open issues; skipping reconcile");
                report.close_failures.push(ItemFailure::new(ItemRef::Listing, &e));
                return;
            }
        };

        tracing::info!(repo = %report.repo, open = open.len(), "closing previous backlog");
        for issue in open {
            if self.cancel.is_cancelled() {
                break;
            }
            match self.tracker.close_issue(&report.repo, issue.number) {
                Ok(()) => {
                    tracing::debug!(number = issue.number, "closed issue");
                    report.closed.push(issue.number);
                }
                Err(e) => {
                    tracing::warn!(number = issue.number, error = %e, "failed to close issue");
                    let item = ItemRef::Existing {
                        number: issue.number,
                        title: issue.title,
                    };
                    report.close_failures.push(ItemFailure::new(item, &e));
                }
            }
        }
    }

    fn create_issues(&self, design: &DesignResult, report: &mut SyncReport) {
        for issue in design.ordered_issues() {
            let item = ItemRef::Backlog {
                order: issue.order,
                title: issue.title.clone(),
            };
            if self.cancel.is_cancelled() {
                report.skipped.push(item);
                continue;
            }

            let payload = self.options.issue_payload(issue);
            match self.tracker.create_issue(&report.repo, &payload) {
                Ok(remote) => {
                    tracing::debug!(order = issue.order, number = remote.number, "created issue");
                    report.created.push(CreatedIssue {
                        order: issue.order,
                        number: remote.number,
                        title: remote.title,
                        url: remote.html_url,
                    });
                }
                Err(e) => {
                    tracing::warn!(order = issue.order, title = %issue.title, error = %e, "failed to create issue");
                    report.failures.push(ItemFailure::new(item, &e));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
