//! Inbound adapters translating external requests into domain service calls.
//!
//! Framework details stay here; handlers delegate to the driving ports.

pub mod http;
