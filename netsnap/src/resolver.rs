//! Device-type tag to driver family resolution.
//!
//! Inventories carry the device-type tags operators already use for
//! other tooling (`cisco_ios`, `arista_eos`, ...). Each tag maps to one
//! driver family, which owns the platform definition and the CLI
//! vocabulary the getters need.

use std::fmt;

use serde::Serialize;

use crate::platform::PlatformDefinition;
use crate::platform::vendors::{arista_eos, cisco_ios, cisco_iosxr, cisco_nxos, juniper_junos};

/// Protocol driver family selected per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Ios,
    Nxos,
    Iosxr,
    Eos,
    Junos,
}

/// Driver used when a tag is absent or not in [`DRIVER_MAP`].
pub const DEFAULT_DRIVER: DriverKind = DriverKind::Ios;

/// Device-type tag to driver family.
pub const DRIVER_MAP: &[(&str, DriverKind)] = &[
    ("cisco_ios", DriverKind::Ios),
    ("cisco_xe", DriverKind::Ios),
    ("cisco_nxos", DriverKind::Nxos),
    ("cisco_xr", DriverKind::Iosxr),
    ("arista_eos", DriverKind::Eos),
    ("juniper", DriverKind::Junos),
    ("juniper_junos", DriverKind::Junos),
];

/// Resolve a device-type tag. Unknown tags fall back to [`DEFAULT_DRIVER`].
pub fn resolve_driver(device_type: &str) -> DriverKind {
    DRIVER_MAP
        .iter()
        .find(|(tag, _)| *tag == device_type)
        .map(|(_, kind)| *kind)
        .unwrap_or(DEFAULT_DRIVER)
}

impl DriverKind {
    /// Short identifier, as used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            DriverKind::Ios => "ios",
            DriverKind::Nxos => "nxos",
            DriverKind::Iosxr => "iosxr",
            DriverKind::Eos => "eos",
            DriverKind::Junos => "junos",
        }
    }

    /// Vendor name reported in facts.
    pub fn vendor(self) -> &'static str {
        match self {
            DriverKind::Ios | DriverKind::Nxos | DriverKind::Iosxr => "Cisco",
            DriverKind::Eos => "Arista",
            DriverKind::Junos => "Juniper",
        }
    }

    /// Prompt and privilege definition for this family.
    pub fn platform(self) -> PlatformDefinition {
        match self {
            DriverKind::Ios => cisco_ios::platform(),
            DriverKind::Nxos => cisco_nxos::platform(),
            DriverKind::Iosxr => cisco_iosxr::platform(),
            DriverKind::Eos => arista_eos::platform(),
            DriverKind::Junos => juniper_junos::platform(),
        }
    }

    pub fn running_config_command(self) -> &'static str {
        match self {
            DriverKind::Junos => "show configuration",
            _ => "show running-config",
        }
    }

    /// IOS-XR and JUNOS have no separate startup configuration.
    pub fn startup_config_command(self) -> Option<&'static str> {
        match self {
            DriverKind::Ios | DriverKind::Nxos | DriverKind::Eos => Some("show startup-config"),
            DriverKind::Iosxr | DriverKind::Junos => None,
        }
    }

    /// Commands whose combined output the facts parser reads.
    pub fn facts_commands(self) -> &'static [&'static str] {
        match self {
            DriverKind::Ios | DriverKind::Iosxr | DriverKind::Nxos => &["show version"],
            DriverKind::Eos => &["show version", "show hostname"],
            DriverKind::Junos => &["show version", "show chassis hardware"],
        }
    }

    pub fn interfaces_command(self) -> &'static str {
        match self {
            DriverKind::Junos => "show interfaces terse",
            _ => "show interfaces",
        }
    }

    /// Command that persists the running configuration. `None` on
    /// commit-based platforms, where `commit` already persisted it.
    pub fn save_command(self) -> Option<&'static str> {
        match self {
            DriverKind::Ios | DriverKind::Eos => Some("write memory"),
            DriverKind::Nxos => Some("copy running-config startup-config"),
            DriverKind::Iosxr | DriverKind::Junos => None,
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(resolve_driver("cisco_ios"), DriverKind::Ios);
        assert_eq!(resolve_driver("cisco_xe"), DriverKind::Ios);
        assert_eq!(resolve_driver("cisco_nxos"), DriverKind::Nxos);
        assert_eq!(resolve_driver("cisco_xr"), DriverKind::Iosxr);
        assert_eq!(resolve_driver("arista_eos"), DriverKind::Eos);
        assert_eq!(resolve_driver("juniper"), DriverKind::Junos);
        assert_eq!(resolve_driver("juniper_junos"), DriverKind::Junos);
    }

    #[test]
    fn test_unknown_tag_uses_default() {
        assert_eq!(resolve_driver("cisco_asa"), DEFAULT_DRIVER);
        assert_eq!(resolve_driver(""), DriverKind::Ios);
    }

    #[test]
    fn test_every_family_has_a_valid_platform() {
        for (_, kind) in DRIVER_MAP {
            assert!(kind.platform().validate().is_ok(), "{kind}");
        }
    }

    #[test]
    fn test_commit_platforms_have_no_save_or_startup() {
        for kind in [DriverKind::Iosxr, DriverKind::Junos] {
            assert!(kind.platform().commit_command.is_some());
            assert!(kind.save_command().is_none());
            assert!(kind.startup_config_command().is_none());
        }
        assert_eq!(DriverKind::Nxos.save_command(), Some("copy running-config startup-config"));
    }
}
