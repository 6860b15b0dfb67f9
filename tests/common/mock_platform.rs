//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use patchbridge::error::{Error, Result};
use patchbridge::platform::PlatformService;
use patchbridge::types::{PlatformConfig, PullRequest};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// Simple mock platform service for testing
///
/// Behaves like a tiny forge: created PRs show up in later listings and
/// closed PRs disappear from them, so consecutive runs see each other's
/// effects.
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    open_prs: Mutex<Vec<PullRequest>>,
    // Call tracking
    list_calls: AtomicU64,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    close_pr_calls: Mutex<Vec<u64>>,
    delete_branch_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_list: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
    error_on_close_pr: Mutex<Option<u64>>,
    error_on_delete_branch: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(1000),
            open_prs: Mutex::new(Vec::new()),
            list_calls: AtomicU64::new(0),
            create_pr_calls: Mutex::new(Vec::new()),
            close_pr_calls: Mutex::new(Vec::new()),
            delete_branch_calls: Mutex::new(Vec::new()),
            error_on_list: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
            error_on_close_pr: Mutex::new(None),
            error_on_delete_branch: Mutex::new(None),
        }
    }

    /// Add an already open PR
    pub fn add_open_pr(&self, pr: PullRequest) {
        self.open_prs.lock().unwrap().push(pr);
    }

    // === Error injection methods ===

    /// Make `list_open_prs` return an error
    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Let `create_pr` succeed again
    pub fn clear_create_pr_error(&self) {
        *self.error_on_create_pr.lock().unwrap() = None;
    }

    /// Make `close_pr` fail for one PR
    pub fn fail_close_pr(&self, pr_number: u64) {
        *self.error_on_close_pr.lock().unwrap() = Some(pr_number);
    }

    /// Make `delete_branch` return an error
    pub fn fail_delete_branch(&self, msg: &str) {
        *self.error_on_delete_branch.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// Number of `list_open_prs` calls
    pub fn list_call_count(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all closed PR numbers
    pub fn get_close_pr_calls(&self) -> Vec<u64> {
        self.close_pr_calls.lock().unwrap().clone()
    }

    /// Get all deleted branches
    pub fn get_delete_branch_calls(&self) -> Vec<String> {
        self.delete_branch_calls.lock().unwrap().clone()
    }

    /// Currently open PRs
    pub fn open_prs(&self) -> Vec<PullRequest> {
        self.open_prs.lock().unwrap().clone()
    }

    /// Number of open PRs whose title carries the tag of `series_id`
    pub fn open_pr_count_for_series(&self, series_id: u64) -> usize {
        self.open_prs
            .lock()
            .unwrap()
            .iter()
            .filter(|pr| patchbridge::platform::parse_series_tag(&pr.title) == Some(series_id))
            .count()
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.error_on_list.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self.open_prs.lock().unwrap().clone())
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = make_pr(number, title, head);
        self.open_prs.lock().unwrap().push(pr.clone());
        Ok(pr)
    }

    async fn close_pr(&self, pr_number: u64) -> Result<()> {
        self.close_pr_calls.lock().unwrap().push(pr_number);
        if *self.error_on_close_pr.lock().unwrap() == Some(pr_number) {
            return Err(Error::GitHubApi(format!("cannot close #{pr_number}")));
        }
        self.open_prs.lock().unwrap().retain(|pr| pr.number != pr_number);
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.delete_branch_calls
            .lock()
            .unwrap()
            .push(branch.to_string());
        if let Some(msg) = self.error_on_delete_branch.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

/// Create a test platform config
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "bluez".to_string(),
        repo: "bluez".to_string(),
    }
}

/// Create a test PR
pub fn make_pr(number: u64, title: &str, head: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/bluez/bluez/pull/{number}"),
        base_ref: "workflow".to_string(),
        head_ref: head.to_string(),
        title: title.to_string(),
    }
}

/// Create an open PR tagged for a series, with the series ID as head branch
pub fn make_series_pr(number: u64, series_id: u64) -> PullRequest {
    make_pr(
        number,
        &format!("[PW_SID:{series_id}] series {series_id}"),
        &series_id.to_string(),
    )
}
