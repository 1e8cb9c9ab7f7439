//! # cfddns
//!
//! A dynamic DNS updater for Cloudflare-hosted A records.
//!
//! On each cycle the updater resolves the machine's public IPv4 address,
//! fetches the DNS records behind every configured target and rewrites only
//! the records whose content no longer matches. A stable address produces
//! zero writes.
//!
//! ## Usage
//!
//! ```bash
//! # Show the current IP and what each target points at
//! cfddns status
//!
//! # Run one update cycle
//! cfddns update
//!
//! # Run forever on a schedule (default: every 59 minutes)
//! cfddns daemon
//!
//! # Check the configuration without touching the network
//! cfddns validate
//! ```

pub mod cloudflare;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod resolver;
pub mod targets;

pub use cloudflare::{CloudflareClient, DnsApi};
pub use config::Config;
pub use error::{Error, Result};
pub use reconciler::{run_cycle, CycleReport};
pub use resolver::{HttpIpResolver, IpSource};
pub use targets::{parse_targets, DomainTarget};
