//! Remote issue-tracker boundary.
//!
//! [`IssueTracker`] is the seam the sync engine talks through; [`github`]
//! implements it over the GitHub REST API.

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod github;

#[cfg(test)]
pub(crate) mod fake;

/// `(owner, name)` of a remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRepo {
    pub name: String,
    pub description: String,
    pub private: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// An issue as listed or returned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Outcome of a repository creation request that reached the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCreation {
    Created,
    /// The name is already in use by the authenticated owner.
    NameTaken,
}

/// Which open issues to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueFilter {
    All,
    Label(String),
}

pub trait IssueTracker {
    /// Login of the authenticated identity; used as the owner in every path.
    fn current_login(&self) -> Result<String, TrackerError>;

    fn create_repo(&self, repo: &NewRepo) -> Result<RepoCreation, TrackerError>;

    /// Succeeds only if the repository exists and is visible.
    fn get_repo(&self, repo: &RepoRef) -> Result<(), TrackerError>;

    /// Open issues (pull requests excluded).
    fn list_open_issues(&self, repo: &RepoRef, filter: &IssueFilter) -> Result<Vec<RemoteIssue>, TrackerError>;

    fn close_issue(&self, repo: &RepoRef, number: u64) -> Result<(), TrackerError>;

    fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<RemoteIssue, TrackerError>;
}
