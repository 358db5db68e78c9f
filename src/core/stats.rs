use std::time::SystemTime;
use serde::{Serialize, Deserialize};

/// Extension statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionStats {
    // General info
    pub uptime_secs: u64,
    pub start_time: SystemTime,

    // Catalog metrics
    pub attached_databases: usize,
    pub discovered_schemas: usize,
    pub discovered_tables: usize,
    pub materialized_tables: usize,

    // Lifecycle metrics
    pub attaches: u64,
    pub replaces: u64,
    pub detaches: u64,

    // Internal attachment metrics
    pub internal_attachments: InternalAttachmentStats,
    pub rejected_writes: u64,
    pub bindings: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalAttachmentStats {
    pub created: u64,
    pub refreshed: u64,
    pub removed: u64,
    pub live: usize,
}

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl HealthCheckResult {
    /// Worst status among `checks`
    pub fn from_checks(checks: Vec<HealthCheck>) -> Self {
        let status = checks.iter()
            .map(|c| &c.status)
            .find(|s| matches!(s, HealthStatus::Unhealthy(_)))
            .or_else(|| checks.iter().map(|c| &c.status).find(|s| !s.is_healthy()))
            .cloned()
            .unwrap_or(HealthStatus::Healthy);
        HealthCheckResult {
            status,
            checks,
            timestamp: SystemTime::now(),
        }
    }
}
