//! Parsers turning vendor CLI output into [`Facts`] and [`Interfaces`].
//!
//! These cover the fields the backup artifacts carry, not the whole
//! output. Anything a parser cannot find is left empty rather than
//! treated as an error: a device that prints an unfamiliar `show version`
//! still gets its configuration backed up.

use regex::Regex;

use super::{Facts, Interface, Interfaces};
use crate::resolver::DriverKind;

/// Candidate patterns per fact; the first capture that matches wins.
struct FactPatterns {
    hostname: &'static [&'static str],
    model: &'static [&'static str],
    os_version: &'static [&'static str],
    serial_number: &'static [&'static str],
    uptime: &'static [&'static str],
}

fn fact_patterns(kind: DriverKind) -> FactPatterns {
    match kind {
        DriverKind::Ios => FactPatterns {
            hostname: &[r"(?m)^(\S+) uptime is "],
            model: &[r"(?m)^[Cc]isco (\S+) \(.*\) processor"],
            os_version: &[r"(?m)^Cisco IOS.*Software.*?, Version ([^,\s]+)"],
            serial_number: &[r"(?m)^Processor board ID (\S+)"],
            uptime: &[r"(?m)^\S+ uptime is (.+?)\s*$"],
        },
        DriverKind::Iosxr => FactPatterns {
            hostname: &[r"(?m)^(\S+) uptime is "],
            model: &[r"(?m)^cisco (\S+).*(?:processor|[Cc]hassis)"],
            os_version: &[
                r"(?m)Cisco IOS XR Software, Version ([^\s\[]+)",
                r"(?m)^\s*Version\s*:\s*(\S+)",
            ],
            serial_number: &[],
            uptime: &[r"(?m)^\S+ uptime is (.+?)\s*$"],
        },
        DriverKind::Nxos => FactPatterns {
            hostname: &[r"(?m)^\s*Device name:\s*(\S+)"],
            model: &[r"(?m)^\s*cisco (Nexus.*?)\s+[Cc]hassis"],
            os_version: &[r"(?m)^\s*(?:NXOS|system):\s+version\s+(\S+)"],
            serial_number: &[r"(?m)^\s*Processor [Bb]oard ID\s+(\S+)"],
            uptime: &[r"(?m)^Kernel uptime is (.+?)\s*$"],
        },
        DriverKind::Eos => FactPatterns {
            hostname: &[r"(?m)^Hostname:\s*(\S+)"],
            model: &[r"(?m)^Arista (\S+)"],
            os_version: &[r"(?m)^Software image version:\s*(\S+)"],
            serial_number: &[r"(?m)^Serial number:\s*(\S+)"],
            uptime: &[r"(?m)^Uptime:\s*(.+?)\s*$"],
        },
        DriverKind::Junos => FactPatterns {
            hostname: &[r"(?m)^Hostname:\s*(\S+)"],
            model: &[r"(?m)^Model:\s*(\S+)"],
            os_version: &[
                r"(?m)^Junos:\s*(\S+)",
                r"(?m)^JUNOS .*\[([^\]]+)\]",
            ],
            serial_number: &[r"(?m)^Chassis\s+(\S+)"],
            uptime: &[],
        },
    }
}

fn first_capture(patterns: &[&str], text: &str) -> Option<String> {
    patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse the combined output of [`DriverKind::facts_commands`].
///
/// `interface_list` is left empty; the session fills it from the
/// interface table.
pub fn parse_facts(kind: DriverKind, output: &str) -> Facts {
    let patterns = fact_patterns(kind);
    Facts {
        hostname: first_capture(patterns.hostname, output),
        vendor: kind.vendor().to_string(),
        model: first_capture(patterns.model, output),
        os_version: first_capture(patterns.os_version, output),
        serial_number: first_capture(patterns.serial_number, output),
        uptime: first_capture(patterns.uptime, output),
        interface_list: Vec::new(),
    }
}

/// Parse the output of [`DriverKind::interfaces_command`].
pub fn parse_interfaces(kind: DriverKind, output: &str) -> Interfaces {
    match kind {
        DriverKind::Junos => parse_junos_terse(output),
        _ => parse_cisco_style(output),
    }
}

/// `show interfaces` on IOS, IOS-XR, NX-OS and EOS: one block per
/// interface, opened by an unindented status line.
fn parse_cisco_style(output: &str) -> Interfaces {
    let header = Regex::new(
        r"^(\S+) is (administratively down|up|down|deleted)(?:\s*\([^)]*\))?(?:, line protocol is (\w+))?",
    );
    let description = Regex::new(r"^\s+Description:\s*(.*?)\s*$");
    let mac = Regex::new(
        r"address(?: is|:)\s*([0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}|[0-9a-fA-F]{2}(?::[0-9a-fA-F]{2}){5})",
    );
    let mtu = Regex::new(r"MTU (\d+) bytes");
    let bandwidth = Regex::new(r"BW (\d+) [Kk]bit");
    let admin_state = Regex::new(r"^\s*admin state is (\w+)");

    let (Ok(header), Ok(description), Ok(mac), Ok(mtu), Ok(bandwidth), Ok(admin_state)) =
        (header, description, mac, mtu, bandwidth, admin_state)
    else {
        return Interfaces::new();
    };

    let mut interfaces = Interfaces::new();
    let mut current: Option<String> = None;

    for line in output.lines().map(|l| l.trim_end_matches('\r')) {
        if let Some(caps) = header.captures(line) {
            let name = caps[1].to_string();
            let status = &caps[2];
            let is_up = match caps.get(3) {
                Some(protocol) => protocol.as_str() == "up",
                None => status == "up",
            };
            interfaces.insert(
                name.clone(),
                Interface {
                    is_up,
                    is_enabled: status != "administratively down",
                    ..Interface::default()
                },
            );
            current = Some(name);
            continue;
        }

        // NX-OS prints the admin state unindented under the status line
        if let Some(caps) = admin_state.captures(line) {
            if let Some(entry) = current.as_ref().and_then(|name| interfaces.get_mut(name)) {
                entry.is_enabled = &caps[1] == "up";
            }
            continue;
        }

        if !line.starts_with(char::is_whitespace) {
            current = None;
            continue;
        }

        let Some(entry) = current.as_ref().and_then(|name| interfaces.get_mut(name)) else {
            continue;
        };

        if let Some(caps) = description.captures(line) {
            entry.description = caps[1].to_string();
        }
        if entry.mac_address.is_none() {
            entry.mac_address = mac.captures(line).map(|caps| caps[1].to_lowercase());
        }
        if let Some(caps) = mtu.captures(line) {
            entry.mtu = caps[1].parse().ok();
        }
        if let Some(caps) = bandwidth.captures(line) {
            entry.speed = caps[1].parse::<u64>().ok().map(|kbit| kbit / 1000);
        }
    }

    interfaces
}

/// `show interfaces terse` on JUNOS. Logical units (`ge-0/0/0.0`) are
/// skipped; the table lists physical interfaces only.
fn parse_junos_terse(output: &str) -> Interfaces {
    let Ok(row) = Regex::new(r"^(\S+)\s+(up|down)\s+(up|down)\b") else {
        return Interfaces::new();
    };

    output
        .lines()
        .filter_map(|line| row.captures(line.trim_end_matches('\r')))
        .filter(|caps| !caps[1].contains('.'))
        .map(|caps| {
            (
                caps[1].to_string(),
                Interface {
                    is_enabled: &caps[2] == "up",
                    is_up: &caps[3] == "up",
                    ..Interface::default()
                },
            )
        })
        .collect()
}
