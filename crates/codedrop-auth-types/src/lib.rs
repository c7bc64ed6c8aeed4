//! Identity types shared by Codedrop front ends.
//!
//! Provides the `OperatorHeaders` extractor for identities injected by the chat bridge.

pub mod identity;
