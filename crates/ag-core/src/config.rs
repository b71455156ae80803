//! Runtime configuration for talking to the management API.
//!
//! A [`ClientConfig`] is assembled once by the caller (flags, environment and
//! the user's config file) and handed by value to the transport and the batch
//! callers. Nothing in the core keeps process-wide mutable settings.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Public management API endpoint, without the organization segment.
pub const DEFAULT_BASE_URL: &str = "https://apigee.googleapis.com/v1/organizations";

/// Default number of parallel connections used by batch operations.
pub const DEFAULT_CONN: usize = 4;

/// Configuration shared by every remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, without the organization segment.
    pub base_url: String,
    /// Organization every request is scoped to.
    pub org: String,
    /// Environment for environment-scoped resources.
    pub env: Option<String>,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Upper bound on in-flight requests during batch operations.
    pub conn: Concurrency,
    /// How an HTTP 409 during import is treated.
    pub conflict_policy: ConflictPolicy,
    /// What import does with entities that already exist remotely.
    pub existing_policy: ExistingPolicy,
}

impl ClientConfig {
    /// Creates a configuration for an organization with default settings.
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            org: org.into(),
            env: None,
            token: None,
            conn: Concurrency::default(),
            conflict_policy: ConflictPolicy::default(),
            existing_policy: ExistingPolicy::default(),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the environment.
    #[must_use]
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the concurrency limit.
    #[must_use]
    pub fn with_conn(mut self, conn: Concurrency) -> Self {
        self.conn = conn;
        self
    }

    /// Sets the conflict policy.
    #[must_use]
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Sets the policy for entities that already exist.
    #[must_use]
    pub fn with_existing_policy(mut self, policy: ExistingPolicy) -> Self {
        self.existing_policy = policy;
        self
    }

    /// Checks the settings every remote command needs.
    pub fn validate(&self) -> Result<()> {
        if self.org.trim().is_empty() {
            return Err(Error::missing("organization"));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::missing("base URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Returns the environment or an error if none was configured.
    pub fn require_env(&self) -> Result<&str> {
        self.env
            .as_deref()
            .filter(|env| !env.trim().is_empty())
            .ok_or_else(|| Error::missing("environment"))
    }

    /// Returns the base URL including the organization segment.
    pub fn org_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.org)
    }
}

/// Maximum number of concurrent remote operations in a batch.
///
/// Always at least one; the batch engine further clamps it to the number of
/// jobs so no idle workers are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Concurrency(NonZeroUsize);

impl Concurrency {
    /// Creates a concurrency limit, rejecting zero.
    pub fn new(conn: usize) -> Result<Self> {
        NonZeroUsize::new(conn)
            .map(Self)
            .ok_or_else(|| Error::Validation("number of connections must be at least 1".to_string()))
    }

    /// Returns the limit.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Returns the number of workers for a batch of `jobs` jobs.
    #[must_use]
    pub fn workers_for(self, jobs: usize) -> usize {
        self.get().min(jobs)
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_CONN).unwrap_or(NonZeroUsize::MIN))
    }
}

impl TryFrom<usize> for Concurrency {
    type Error = Error;

    fn try_from(conn: usize) -> Result<Self> {
        Self::new(conn)
    }
}

impl From<Concurrency> for usize {
    fn from(conn: Concurrency) -> Self {
        conn.get()
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an HTTP 409 Conflict is treated while importing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// The entity already exists; log it and count the job as done.
    #[default]
    Ignore,
    /// Record the conflict as a failure like any other error status.
    Fail,
}

impl FromStr for ConflictPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "fail" => Ok(Self::Fail),
            other => Err(Error::Validation(format!(
                "unknown conflict policy: {other}. Supported: ignore, fail"
            ))),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => f.write_str("ignore"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// What import does with an entity whose name is already present remotely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    /// Overwrite the remote entity with the local record.
    #[default]
    Update,
    /// Leave the remote entity untouched.
    Skip,
}
