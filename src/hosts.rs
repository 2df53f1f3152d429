//! Hosts file parsing and in-place rewriting.
//!
//! Reading flattens every data line into one [`HostsEntry`] per hostname.
//! Writing groups edited entries by IP and replaces only the existing lines
//! whose IP is in the group; every other line keeps its original text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HostsError, ParseError};
use crate::platform::{HostsFile, Privilege};

/// One (IP, hostname) pair. A line with several hostnames yields several entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostsEntry {
    pub ip_address: String,
    pub hostname: String,
}

impl HostsEntry {
    pub fn new(ip_address: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            hostname: hostname.into(),
        }
    }
}

/// IP and hostname tokens of a data line, borrowed from the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub ip_address: &'a str,
    pub hostnames: Vec<&'a str>,
}

/// Classification of a raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank or comment-only; always written back untouched.
    Passthrough,
    Data(ParsedLine<'a>),
}

/// True for lines that are empty after trimming or start with `#`.
pub fn is_passthrough(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parse a data line into its IP and hostnames.
///
/// Everything from the first `#` is dropped before tokenizing. Callers filter
/// blank and comment lines first; such lines fail here like any other line
/// without a hostname.
pub fn parse_line(line: &str) -> Result<ParsedLine<'_>, ParseError> {
    let data = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    let mut tokens = data.split_whitespace();
    let ip_address = tokens.next();
    let hostnames: Vec<&str> = tokens.collect();
    match ip_address {
        Some(ip_address) if !hostnames.is_empty() => Ok(ParsedLine {
            ip_address,
            hostnames,
        }),
        _ => Err(ParseError {
            line: line.to_string(),
        }),
    }
}

/// Classify a raw line, parsing it when it carries data.
pub fn classify_line(line: &str) -> Result<Line<'_>, ParseError> {
    if is_passthrough(line) {
        return Ok(Line::Passthrough);
    }
    parse_line(line).map(Line::Data)
}

/// Parse whole file content into entries, in line order then token order.
///
/// The first malformed data line fails the whole parse.
pub fn parse_hosts_content(content: &str) -> Result<Vec<HostsEntry>, HostsError> {
    let mut entries = Vec::new();
    for (idx, raw) in content.split('\n').enumerate() {
        let parsed = match classify_line(raw) {
            Ok(Line::Passthrough) => continue,
            Ok(Line::Data(parsed)) => parsed,
            Err(source) => {
                return Err(HostsError::Parse {
                    line_number: idx + 1,
                    source,
                })
            }
        };
        entries.extend(
            parsed
                .hostnames
                .iter()
                .map(|h| HostsEntry::new(parsed.ip_address, *h)),
        );
    }
    Ok(entries)
}

/// Hostnames keyed by IP, each list in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedByIp {
    groups: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl GroupedByIp {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a HostsEntry>) -> Self {
        let mut grouped = Self::default();
        for entry in entries {
            grouped.push(&entry.ip_address, &entry.hostname);
        }
        grouped
    }

    fn push(&mut self, ip: &str, hostname: &str) {
        match self.index.get(ip) {
            Some(&i) => self.groups[i].1.push(hostname.to_string()),
            None => {
                self.index.insert(ip.to_string(), self.groups.len());
                self.groups
                    .push((ip.to_string(), vec![hostname.to_string()]));
            }
        }
    }

    pub fn get(&self, ip: &str) -> Option<&[String]> {
        self.index.get(ip).map(|&i| self.groups[i].1.as_slice())
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.index.contains_key(ip)
    }

    /// IPs in the order they were first seen.
    pub fn ips(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(ip, _)| ip.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Build `<ip> <hostname1> <hostname2> ...`.
pub fn build_line(ip: &str, hostnames: &[String]) -> String {
    let mut line = String::from(ip);
    for hostname in hostnames {
        line.push(' ');
        line.push_str(hostname);
    }
    line
}

/// Outcome of rewriting content against a set of grouped entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    /// Number of data lines that were replaced.
    pub rewritten: usize,
    /// Grouped IPs with no existing line. These are not written.
    pub unmatched: Vec<String>,
}

/// Replace every data line whose IP is grouped; keep all other lines verbatim.
///
/// Never adds or removes lines. A trailing `\r` on a replaced line is kept.
pub fn rewrite_content(content: &str, grouped: &GroupedByIp) -> Result<Rewrite, HostsError> {
    let mut lines: Vec<String> = Vec::new();
    let mut rewritten = 0;
    let mut seen: Vec<&str> = Vec::new();

    for (idx, raw) in content.split('\n').enumerate() {
        let line = classify_line(raw).map_err(|source| HostsError::Parse {
            line_number: idx + 1,
            source,
        })?;
        let replacement = match line {
            Line::Passthrough => None,
            Line::Data(parsed) => grouped
                .get(parsed.ip_address)
                .map(|hostnames| (parsed.ip_address, hostnames)),
        };
        match replacement {
            Some((ip, hostnames)) => {
                let mut rebuilt = build_line(ip, hostnames);
                if raw.ends_with('\r') {
                    rebuilt.push('\r');
                }
                seen.push(ip);
                rewritten += 1;
                lines.push(rebuilt);
            }
            None => lines.push(raw.to_string()),
        }
    }

    let unmatched = grouped
        .ips()
        .filter(|ip| !seen.contains(ip))
        .map(String::from)
        .collect();

    Ok(Rewrite {
        content: lines.join("\n"),
        rewritten,
        unmatched,
    })
}

/// Read the hosts file and flatten it into entries.
pub fn read_hosts_file(file: &dyn HostsFile) -> Result<Vec<HostsEntry>, HostsError> {
    let content = file.read()?;
    let entries = parse_hosts_content(&content)?;
    debug!(
        path = %file.path().display(),
        entries = entries.len(),
        "read hosts file"
    );
    Ok(entries)
}

/// Lines replaced and IPs dropped by a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub rewritten: usize,
    pub unmatched: Vec<String>,
}

/// Write the complete entry table back into the live hosts file.
///
/// Entries are grouped by IP and applied through the collaborator's
/// read-modify-write, so the rewrite always runs against current content.
/// IPs without an existing line are reported in the summary, not appended.
pub fn write_hosts_file(
    file: &dyn HostsFile,
    privilege: Privilege,
    entries: &[HostsEntry],
) -> Result<WriteSummary, HostsError> {
    let grouped = GroupedByIp::from_entries(entries);
    let mut summary = WriteSummary::default();

    file.modify(privilege, &mut |current: &str| {
        let rewrite = rewrite_content(current, &grouped)?;
        summary = WriteSummary {
            rewritten: rewrite.rewritten,
            unmatched: rewrite.unmatched,
        };
        Ok(rewrite.content)
    })?;

    for ip in &summary.unmatched {
        warn!(ip = %ip, "no existing line for ip; its hostnames were not written");
    }
    info!(
        path = %file.path().display(),
        rewritten = summary.rewritten,
        "hosts file updated"
    );
    Ok(summary)
}
