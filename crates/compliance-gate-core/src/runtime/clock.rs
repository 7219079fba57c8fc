// crates/compliance-gate-core/src/runtime/clock.rs
// ============================================================================
// Module: Compliance Gate System Clock
// Description: Wall-clock implementation of the clock interface.
// Purpose: Provide the default time source for hosts.
// Dependencies: crate::{core, interfaces}, time
// ============================================================================

//! ## Overview
//! [`SystemClock`] is the only place the runtime reads wall-clock time.
//! Tests and replay tools substitute their own [`Clock`].

use time::OffsetDateTime;

use crate::core::Timestamp;
use crate::interfaces::Clock;

/// Wall-clock time source (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Timestamp::from_unix_millis(i64::try_from(millis).unwrap_or(i64::MAX))
    }
}
