//! Repository listing and lookup.

use log::debug;
use serde::Deserialize;

use super::GitHubClient;
use crate::error::Result;

/// The fields of a GitHub repository the sweep cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRepo {
    pub name: String,
    pub ssh_url: String,
    pub default_branch: String,
    #[serde(default)]
    pub archived: bool,
    /// Present when the listing endpoint includes topics.
    #[serde(default)]
    pub topics: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TopicsResponse {
    names: Vec<String>,
}

impl GitHubClient {
    pub(super) fn list_org_repos_paginated(&self, org: &str) -> Result<Vec<RemoteRepo>> {
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            let batch: Vec<RemoteRepo> = self.get_json(&format!(
                "orgs/{}/repos?type=all&per_page={}&page={}",
                org, self.page_size, page
            ))?;
            debug!("Listed page {} of {}: {} repositories", page, org, batch.len());
            let last = batch.len() < self.page_size;
            repos.extend(batch);
            if last {
                break;
            }
            page += 1;
        }
        Ok(repos)
    }

    pub(super) fn fetch_topics(&self, org: &str, name: &str) -> Result<Vec<String>> {
        let response: TopicsResponse = self.get_json(&format!("repos/{}/{}/topics", org, name))?;
        Ok(response.names)
    }
}
