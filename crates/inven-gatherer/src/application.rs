use crate::{ExecutionContext, Gatherer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use inven_common::types::{GathererConfig, Item};
use serde::Serialize;
use tokio::process::Command;

pub const ITEM_NAME: &str = "Host:Application";
pub const SCHEMA_VERSION: &str = "1.0";

/// Which package manager backs the application gatherer on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageBackend {
    Dpkg,
    Rpm,
}

impl PackageBackend {
    /// Probes the host for a supported package manager.
    ///
    /// # Errors
    ///
    /// Returns an error when neither `dpkg-query` nor `rpm` is on `PATH`,
    /// which keeps the application gatherer out of the installed set.
    pub fn detect() -> Result<Self> {
        if find_in_path("dpkg-query") {
            Ok(PackageBackend::Dpkg)
        } else if find_in_path("rpm") {
            Ok(PackageBackend::Rpm)
        } else {
            bail!("no supported package manager (dpkg-query or rpm) found on PATH")
        }
    }
}

fn find_in_path(binary: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| dir.join(binary).is_file())
}

/// Captures the installed software packages reported by the platform
/// package manager.
pub struct ApplicationGatherer {
    backend: PackageBackend,
}

/// One installed package, as listed by the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub architecture: String,
}

impl ApplicationGatherer {
    /// Builds the gatherer after probing the host for a package manager.
    pub fn detect() -> Result<Self> {
        Ok(Self {
            backend: PackageBackend::detect()?,
        })
    }

    /// Builds the gatherer with a fixed backend, skipping the probe. Used
    /// for the supported set (whose handles are never run) and in tests.
    pub fn with_backend(backend: PackageBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Gatherer for ApplicationGatherer {
    fn name(&self) -> &str {
        "application"
    }

    async fn run(&self, ctx: &ExecutionContext, config: &GathererConfig) -> Result<Vec<Item>> {
        let output = match self.backend {
            PackageBackend::Dpkg => Command::new("dpkg-query")
                .args(["-W", "-f", "${Package}\t${Version}\t${Architecture}\n"])
                .output()
                .await
                .context("failed to execute dpkg-query")?,
            PackageBackend::Rpm => Command::new("rpm")
                .args(["-qa", "--qf", "%{NAME}\t%{VERSION}-%{RELEASE}\t%{ARCH}\n"])
                .output()
                .await
                .context("failed to execute rpm")?,
        };

        if !output.status.success() {
            bail!(
                "package manager query exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        let mut records = parse_package_listing(&listing);
        if let Some(prefix) = config.filters.as_deref() {
            records.retain(|r| r.name.starts_with(prefix));
        }
        records.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            agent_id = ctx.agent_id(),
            packages = records.len(),
            backend = ?self.backend,
            "Captured application inventory"
        );

        Ok(vec![Item {
            name: ITEM_NAME.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            content: serde_json::to_string(&records)?,
            captured_at: Utc::now(),
        }])
    }
}

/// Parses the tab-separated `name\tversion\tarch` listing produced by both
/// backends. Malformed lines are skipped.
pub fn parse_package_listing(listing: &str) -> Vec<PackageRecord> {
    listing
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let name = fields.next()?.trim();
            let version = fields.next()?.trim();
            let architecture = fields.next().unwrap_or("").trim();
            if name.is_empty() || version.is_empty() {
                return None;
            }
            Some(PackageRecord {
                name: name.to_string(),
                version: version.to_string(),
                architecture: architecture.to_string(),
            })
        })
        .collect()
}
