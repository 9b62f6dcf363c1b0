//! Built-in platform definitions, one per supported driver family.
//!
//! Prompt patterns are adapted from [scrapli](https://github.com/carlmontanari/scrapli).

pub mod arista_eos;
pub mod cisco_ios;
pub mod cisco_iosxr;
pub mod cisco_nxos;
pub mod juniper_junos;
