//! Update-cycle reconciliation.
//!
//! One cycle resolves the current public IP, fetches the records behind each
//! configured target and rewrites only the records whose content is stale.
//! A stable IP therefore produces zero writes, and per cycle the provider
//! sees at most one read and one write per target.

use crate::cloudflare::DnsApi;
use crate::error::{Error, Result};
use crate::resolver::IpSource;
use crate::targets::DomainTarget;
use std::fmt;
use std::net::Ipv4Addr;

/// What one cycle did, for logging and CLI output.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Address the targets were reconciled against.
    pub ip: Ipv4Addr,
    /// Records rewritten this cycle.
    pub updated: usize,
    /// Records already pointing at the resolved IP.
    pub up_to_date: usize,
    /// Targets that could not be reconciled (fetch failed, no matching
    /// record, or the provider rejected the write).
    pub failed: usize,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ip={} updated={} up-to-date={} failed={}",
            self.ip, self.updated, self.up_to_date, self.failed
        )
    }
}

/// Run one reconciliation cycle.
///
/// Aborts with an error (zero writes) if IP resolution fails or no targets
/// are configured. Per-target failures are contained: the failing target is
/// logged and counted, and the remaining targets still proceed.
pub async fn run_cycle(
    ip_source: &dyn IpSource,
    dns: &dyn DnsApi,
    targets: &[DomainTarget],
) -> Result<CycleReport> {
    let ip = ip_source.resolve().await?;

    if targets.is_empty() {
        return Err(Error::Config("no domain targets configured".to_string()));
    }

    let mut report = CycleReport {
        ip,
        updated: 0,
        up_to_date: 0,
        failed: 0,
        completed_at: chrono::Utc::now(),
    };

    for target in targets {
        let records = match dns.fetch_records(&target.zone_id).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to fetch records for {}: {}", target.name, e);
                report.failed += 1;
                continue;
            }
        };

        // A target only ever maps onto the one A record whose id and zone
        // both match its configuration.
        let matched = records.iter().find(|r| {
            r.id == target.record_id && r.zone_id == target.zone_id && r.record_type == "A"
        });

        let Some(record) = matched else {
            tracing::warn!(
                "No A record with id {} in zone {} for target {}; check the target spec",
                target.record_id,
                target.zone_id,
                target.name
            );
            report.failed += 1;
            continue;
        };

        if record.content == ip.to_string() {
            tracing::debug!("{} already points at {}", target.name, ip);
            report.up_to_date += 1;
            continue;
        }

        tracing::info!(
            "Updating {} from {} to {}",
            target.name,
            record.content,
            ip
        );
        match dns.update_record(record, ip).await {
            Ok(()) => {
                tracing::info!("Updated {}", target.name);
                report.updated += 1;
            }
            Err(e) => {
                tracing::error!("Failed to update {}: {}", target.name, e);
                report.failed += 1;
            }
        }
    }

    report.completed_at = chrono::Utc::now();
    Ok(report)
}
