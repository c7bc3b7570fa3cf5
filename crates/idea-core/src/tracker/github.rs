use super::{IssueFilter, IssueTracker, NewIssue, NewRepo, RemoteIssue, RepoCreation, RepoRef};
use crate::config::{Credentials, GithubConfig};
use crate::error::TrackerError;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const API_VERSION: &str = "2022-11-28";

/// Blocking GitHub REST client. Every request carries the bearer token and
/// the configured per-call timeout; a timeout surfaces as [`TrackerError::Http`].
pub struct GithubClient {
    http: Client,
    api_url: String,
    per_page: u32,
    max_pages: u32,
}

#[derive(Deserialize)]
struct User {
    login: String,
}

#[derive(Deserialize)]
struct ListedIssue {
    number: u64,
    title: String,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl GithubClient {
    pub fn new(config: &GithubConfig, credentials: &Credentials) -> Result<Self, TrackerError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credentials.token()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("idea-forge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            per_page: config.per_page.clamp(1, 100),
            max_pages: config.max_pages.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn issues_url(&self, repo: &RepoRef) -> String {
        self.url(&format!("/repos/{}/{}/issues", repo.owner, repo.name))
    }
}

/// Non-success responses become [`TrackerError::Status`] carrying the body.
fn check_response(resp: Response) -> Result<Response, TrackerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(TrackerError::Status {
        status: status.as_u16(),
        body: resp.text().unwrap_or_default(),
    })
}

fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, TrackerError> {
    resp.json::<T>()
        .map_err(|e| TrackerError::Decode(e.to_string()))
}

impl IssueTracker for GithubClient {
    fn current_login(&self) -> Result<String, TrackerError> {
        let resp = check_response(self.http.get(self.url("/user")).send()?)?;
        let user: User = decode(resp)?;
        Ok(user.login)
    }

    fn create_repo(&self, repo: &NewRepo) -> Result<RepoCreation, TrackerError> {
        let resp = self.http.post(self.url("/user/repos")).json(repo).send()?;
        if resp.status() == StatusCode::UNPROCESSABLE_ENTITY {
            tracing::debug!(body = %resp.text().unwrap_or_default(), "repository creation returned 422");
            return Ok(RepoCreation::NameTaken);
        }
        check_response(resp)?;
        Ok(RepoCreation::Created)
    }

    fn get_repo(&self, repo: &RepoRef) -> Result<(), TrackerError> {
        let url = self.url(&format!("/repos/{}/{}", repo.owner, repo.name));
        check_response(self.http.get(url).send()?)?;
        Ok(())
    }

    fn list_open_issues(&self, repo: &RepoRef, filter: &IssueFilter) -> Result<Vec<RemoteIssue>, TrackerError> {
        let url = self.issues_url(repo);
        let mut issues = Vec::new();

        for page in 1..=self.max_pages {
            let mut req = self.http.get(&url).query(&[
                ("state", "open".to_string()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ]);
            if let IssueFilter::Label(label) = filter {
                req = req.query(&[("labels", label.as_str())]);
            }

            let listed: Vec<ListedIssue> = decode(check_response(req.send()?)?)?;
            let full_page = listed.len() as u32 >= self.per_page;
            issues.extend(
                listed
                    .into_iter()
                    .filter(|i| i.pull_request.is_none())
                    .map(|i| RemoteIssue {
                        number: i.number,
                        title: i.title,
                        html_url: i.html_url,
                    }),
            );

            if !full_page {
                break;
            }
            if page == self.max_pages {
                tracing::warn!(repo = %repo, max_pages = self.max_pages, "open-issue listing truncated at page limit");
            }
        }

        Ok(issues)
    }

    fn close_issue(&self, repo: &RepoRef, number: u64) -> Result<(), TrackerError> {
        let url = format!("{}/{number}", self.issues_url(repo));
        let resp = self
            .http
            .patch(url)
            .json(&serde_json::json!({ "state": "closed" }))
            .send()?;
        check_response(resp)?;
        Ok(())
    }

    fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<RemoteIssue, TrackerError> {
        let resp = self.http.post(self.issues_url(repo)).json(issue).send()?;
        decode(check_response(resp)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
