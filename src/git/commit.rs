//! Commit records as observed by the release pipeline.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A commit observed by the release pipeline.
///
/// Only `hash` and `subject` take part in attribution; the remaining fields
/// are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full SHA-1 hash of the commit
    pub hash: String,
    /// First line of the commit message
    pub subject: String,
    /// The complete commit message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Commit author name and email address
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// Commit date with timezone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<FixedOffset>>,
}

/// A commit together with the files it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedCommit {
    /// The commit itself
    #[serde(flatten)]
    pub commit: Commit,
    /// Changed file paths relative to the repository root, in diff order
    pub files: Vec<String>,
}

impl Commit {
    /// Creates a commit record from a hash and subject line.
    pub fn new(hash: impl Into<String>, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        Self {
            hash: hash.into(),
            message: subject.clone(),
            subject,
            author: String::new(),
            date: None,
        }
    }

    /// Creates a commit record from a git2 commit.
    pub fn from_git_commit(commit: &git2::Commit) -> Result<Self> {
        let hash = commit.id().to_string();

        let author = format!(
            "{} <{}>",
            commit.author().name().unwrap_or("Unknown"),
            commit.author().email().unwrap_or("unknown@example.com")
        );

        let timestamp = commit.author().when();
        let offset = FixedOffset::east_opt(timestamp.offset_minutes() * 60)
            .context("Invalid commit timezone offset")?;
        let date = DateTime::from_timestamp(timestamp.seconds(), 0)
            .context("Invalid commit timestamp")?
            .with_timezone(&offset);

        let message = commit.message().unwrap_or("").to_string();
        let subject = message.lines().next().unwrap_or("").to_string();

        Ok(Self {
            hash,
            subject,
            message,
            author,
            date: Some(date),
        })
    }

    /// Attaches a changed-file list to this commit.
    pub fn with_files(self, files: Vec<String>) -> AnnotatedCommit {
        AnnotatedCommit {
            commit: self,
            files,
        }
    }
}

impl AnnotatedCommit {
    /// Full hash of the underlying commit.
    pub fn hash(&self) -> &str {
        &self.commit.hash
    }

    /// Subject line of the underlying commit.
    pub fn subject(&self) -> &str {
        &self.commit.subject
    }
}
