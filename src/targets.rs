//! Domain target list parsing.
//!
//! Targets are configured as `name;zoneID;recordID` triples, several triples
//! joined with `|`:
//!
//! ```text
//! home.example.com;023e105f4ecef8ad9ca31a8372d0c353;372e67954025e0ba6aaa6d586b9e0b59
//! ```

use crate::error::{Error, Result};

/// One configured mapping: a record that should track the current public IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTarget {
    /// Display name, used only for logging.
    pub name: String,
    /// Cloudflare zone identifier.
    pub zone_id: String,
    /// Identifier of the A record inside the zone.
    pub record_id: String,
}

/// Parse the raw target specification.
///
/// Strict all-or-nothing: if any triple does not split into exactly three
/// non-empty fields, the whole input is rejected. Accepting the well-formed
/// remainder would silently leave part of the configuration unmanaged.
pub fn parse_targets(raw: &str) -> Result<Vec<DomainTarget>> {
    let mut targets = Vec::new();

    for entry in raw.split('|') {
        let fields: Vec<&str> = entry.split(';').map(str::trim).collect();
        if fields.len() != 3 || fields.iter().any(|f| f.is_empty()) {
            return Err(Error::Config(format!(
                "invalid domain target {entry:?}: expected name;zoneID;recordID"
            )));
        }
        targets.push(DomainTarget {
            name: fields[0].to_string(),
            zone_id: fields[1].to_string(),
            record_id: fields[2].to_string(),
        });
    }

    Ok(targets)
}
