use super::{IssueFilter, IssueTracker, NewIssue, NewRepo, RemoteIssue, RepoCreation, RepoRef};
use crate::error::TrackerError;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone)]
pub(crate) struct FakeIssue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub open: bool,
}

/// In-memory tracker with failure injection. State persists across runs
/// against the same instance, like a real remote.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub repos: BTreeSet<String>,
    pub issues: Vec<FakeIssue>,
    pub login_status: Option<u16>,
    pub create_repo_status: Option<u16>,
    pub get_repo_status: Option<u16>,
    pub list_status: Option<u16>,
    pub failing_titles: HashSet<String>,
    pub failing_closes: HashSet<u64>,
    pub calls: Vec<String>,
}

pub(crate) struct FakeTracker {
    pub login: String,
    pub state: RefCell<FakeState>,
}

impl FakeTracker {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            state: RefCell::new(FakeState::default()),
        }
    }

    pub fn with_repo(self, name: &str) -> Self {
        self.state.borrow_mut().repos.insert(name.to_string());
        self
    }

    pub fn seed_issue(&self, title: &str, labels: &[&str]) -> u64 {
        let mut state = self.state.borrow_mut();
        let number = state.issues.len() as u64 + 1;
        state.issues.push(FakeIssue {
            number,
            title: title.to_string(),
            body: String::new(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            open: true,
        });
        number
    }

    pub fn open_numbers(&self) -> Vec<u64> {
        self.state
            .borrow()
            .issues
            .iter()
            .filter(|i| i.open)
            .map(|i| i.number)
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn status(code: u16) -> TrackerError {
    TrackerError::Status {
        status: code,
        body: format!("{{\"message\":\"injected {code}\"}}"),
    }
}

impl IssueTracker for FakeTracker {
    fn current_login(&self) -> Result<String, TrackerError> {
        self.record("GET /user".into());
        match self.state.borrow().login_status {
            Some(code) => Err(status(code)),
            None => Ok(self.login.clone()),
        }
    }

    fn create_repo(&self, repo: &NewRepo) -> Result<RepoCreation, TrackerError> {
        self.record(format!("POST /user/repos {}", repo.name));
        let mut state = self.state.borrow_mut();
        match state.create_repo_status {
            Some(422) => Ok(RepoCreation::NameTaken),
            Some(code) => Err(status(code)),
            None if state.repos.contains(&repo.name) => Ok(RepoCreation::NameTaken),
            None => {
                state.repos.insert(repo.name.clone());
                Ok(RepoCreation::Created)
            }
        }
    }

    fn get_repo(&self, repo: &RepoRef) -> Result<(), TrackerError> {
        self.record(format!("GET /repos/{repo}"));
        let state = self.state.borrow();
        match state.get_repo_status {
            Some(code) if code >= 300 => Err(status(code)),
            Some(_) => Ok(()),
            None if state.repos.contains(&repo.name) => Ok(()),
            None => Err(status(404)),
        }
    }

    fn list_open_issues(&self, repo: &RepoRef, filter: &IssueFilter) -> Result<Vec<RemoteIssue>, TrackerError> {
        self.record(format!("GET /repos/{repo}/issues"));
        let state = self.state.borrow();
        if let Some(code) = state.list_status {
            return Err(status(code));
        }
        Ok(state
            .issues
            .iter()
            .filter(|i| i.open)
            .filter(|i| match filter {
                IssueFilter::All => true,
                IssueFilter::Label(label) => i.labels.contains(label),
            })
            .map(|i| RemoteIssue {
                number: i.number,
                title: i.title.clone(),
                html_url: None,
            })
            .collect())
    }

    fn close_issue(&self, repo: &RepoRef, number: u64) -> Result<(), TrackerError> {
        self.record(format!("PATCH /repos/{repo}/issues/{number}"));
        let mut state = self.state.borrow_mut();
        if state.failing_closes.contains(&number) {
            return Err(status(500));
        }
        match state.issues.iter_mut().find(|i| i.number == number) {
            Some(issue) => {
                issue.open = false;
                Ok(())
            }
            None => Err(status(404)),
        }
    }

    fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<RemoteIssue, TrackerError> {
        self.record(format!("POST /repos/{repo}/issues {}", issue.title));
        let mut state = self.state.borrow_mut();
        if state.failing_titles.contains(&issue.title) {
            return Err(status(422));
        }
        let number = state.issues.len() as u64 + 1;
        state.issues.push(FakeIssue {
            number,
            title: issue.title.clone(),
            body: issue.body.clone(),
            labels: issue.labels.clone(),
            open: true,
        });
        Ok(RemoteIssue {
            number,
            title: issue.title.clone(),
            html_url: Some(format!("https://github.test/{repo}/issues/{number}")),
        })
    }
}
