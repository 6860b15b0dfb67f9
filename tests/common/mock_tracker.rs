//! Mock tracker service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use patchbridge::error::{Error, Result};
use patchbridge::tracker::{CheckSubmission, TrackerService};
use patchbridge::types::{
    CheckReport, CheckState, Patch, PatchRef, Series, SeriesRef, Submitter,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory tracker
///
/// Series added with [`MockTracker::add_series`] are listed by
/// `fetch_patches_by_state` (every patch of the series, regardless of the
/// requested states).
pub struct MockTracker {
    series: Mutex<HashMap<u64, Series>>,
    patches: Mutex<HashMap<u64, Patch>>,
    listed: Mutex<Vec<u64>>,
    // Call tracking
    fetch_series_calls: Mutex<Vec<u64>>,
    fetch_patch_calls: Mutex<Vec<u64>>,
    fetch_mbox_calls: Mutex<Vec<String>>,
    list_calls: Mutex<Vec<Vec<String>>>,
    submitted_checks: Mutex<Vec<CheckReport>>,
    // Error injection
    error_on_list: Mutex<Option<String>>,
    error_on_submit_check: Mutex<HashSet<u64>>,
    error_on_mbox: Mutex<HashSet<u64>>,
}

impl Default for MockTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTracker {
    pub fn new() -> Self {
        Self {
            series: Mutex::new(HashMap::new()),
            patches: Mutex::new(HashMap::new()),
            listed: Mutex::new(Vec::new()),
            fetch_series_calls: Mutex::new(Vec::new()),
            fetch_patch_calls: Mutex::new(Vec::new()),
            fetch_mbox_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
            submitted_checks: Mutex::new(Vec::new()),
            error_on_list: Mutex::new(None),
            error_on_submit_check: Mutex::new(HashSet::new()),
            error_on_mbox: Mutex::new(HashSet::new()),
        }
    }

    /// Add a series with its patches, all pending.
    ///
    /// Each patch is given as (patch id, subject, diff).
    pub fn add_series<D: AsRef<str>>(&self, id: u64, name: Option<&str>, patches: &[(u64, &str, D)]) {
        let mut refs = Vec::new();
        for (patch_id, subject, diff) in patches {
            let patch_id = *patch_id;
            let mbox_url = format!("http://tracker.test/patch/{patch_id}/mbox/");
            let msgid = format!("<{patch_id}@example.com>");
            refs.push(PatchRef {
                id: patch_id,
                name: subject.to_string(),
                mbox_url: mbox_url.clone(),
                msgid: msgid.clone(),
            });
            self.patches.lock().unwrap().insert(
                patch_id,
                Patch {
                    id: patch_id,
                    name: subject.to_string(),
                    content: Some(format!("commit message of {patch_id}")),
                    diff: Some(diff.as_ref().to_string()),
                    mbox_url,
                    msgid,
                    check_state: CheckState::Pending,
                    series: vec![SeriesRef { id }],
                },
            );
            self.listed.lock().unwrap().push(patch_id);
        }

        self.series.lock().unwrap().insert(
            id,
            Series {
                id,
                name: name.map(ToString::to_string),
                submitter: Submitter {
                    email: format!("dev{id}@example.com"),
                    name: None,
                },
                patches: refs,
            },
        );
    }

    /// Set the check state of a patch
    pub fn set_check_state(&self, patch_id: u64, state: CheckState) {
        if let Some(p) = self.patches.lock().unwrap().get_mut(&patch_id) {
            p.check_state = state;
        }
    }

    // === Error injection methods ===

    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_submit_check(&self, patch_id: u64) {
        self.error_on_submit_check.lock().unwrap().insert(patch_id);
    }

    pub fn fail_mbox(&self, patch_id: u64) {
        self.error_on_mbox.lock().unwrap().insert(patch_id);
    }

    // === Call verification methods ===

    pub fn get_fetch_series_calls(&self) -> Vec<u64> {
        self.fetch_series_calls.lock().unwrap().clone()
    }

    pub fn get_fetch_patch_calls(&self) -> Vec<u64> {
        self.fetch_patch_calls.lock().unwrap().clone()
    }

    pub fn get_fetch_mbox_calls(&self) -> Vec<String> {
        self.fetch_mbox_calls.lock().unwrap().clone()
    }

    pub fn get_list_calls(&self) -> Vec<Vec<String>> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn get_submitted_checks(&self) -> Vec<CheckReport> {
        self.submitted_checks.lock().unwrap().clone()
    }
}

fn mbox_patch_id(url: &str) -> Option<u64> {
    url.trim_end_matches('/')
        .trim_end_matches("/mbox")
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

#[async_trait]
impl TrackerService for MockTracker {
    async fn fetch_series(&self, id: u64) -> Result<Series> {
        self.fetch_series_calls.lock().unwrap().push(id);
        self.series
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::TrackerUnavailable {
                method: "GET",
                url: format!("/series/{id}"),
                status: 404,
            })
    }

    async fn fetch_patch(&self, id: u64) -> Result<Patch> {
        self.fetch_patch_calls.lock().unwrap().push(id);
        self.patches
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::TrackerUnavailable {
                method: "GET",
                url: format!("/patches/{id}"),
                status: 404,
            })
    }

    async fn fetch_patches_by_state(&self, states: &[String]) -> Result<Vec<Patch>> {
        self.list_calls.lock().unwrap().push(states.to_vec());
        if let Some(msg) = self.error_on_list.lock().unwrap().as_ref() {
            return Err(Error::Internal(msg.clone()));
        }
        let patches = self.patches.lock().unwrap();
        Ok(self
            .listed
            .lock()
            .unwrap()
            .iter()
            .filter_map(|id| patches.get(id).cloned())
            .collect())
    }

    async fn fetch_mbox(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch_mbox_calls.lock().unwrap().push(url.to_string());
        let id = mbox_patch_id(url).unwrap_or_default();
        if self.error_on_mbox.lock().unwrap().contains(&id) {
            return Err(Error::TrackerUnavailable {
                method: "GET",
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(format!("From: dev@example.com\nSubject: [PATCH] {id}\n\n---\n").into_bytes())
    }

    async fn submit_check(&self, report: &CheckReport) -> Result<CheckSubmission> {
        if self
            .error_on_submit_check
            .lock()
            .unwrap()
            .contains(&report.patch_id)
        {
            return Err(Error::TrackerUnavailable {
                method: "POST",
                url: format!("/patches/{}/checks/", report.patch_id),
                status: 503,
            });
        }
        self.submitted_checks.lock().unwrap().push(report.clone());
        Ok(CheckSubmission::Posted)
    }
}
