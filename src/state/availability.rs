// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Availability state machine.

/// Tracks consecutive failed availability checks.
///
/// The counter climbs by one per failure and saturates at
/// [`CEILING`](Self::CEILING) once it has passed
/// [`THRESHOLD`](Self::THRESHOLD). A device is available while the counter
/// does not exceed the threshold, so the fourth consecutive failure is the
/// first one reported. Any success resets the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Availability {
    counter: u8,
}

impl Availability {
    /// Failures tolerated before the device is reported unavailable.
    pub const THRESHOLD: u8 = 3;

    /// Value the counter saturates at.
    pub const CEILING: u8 = 4;

    /// Creates a tracker for an available device.
    #[must_use]
    pub const fn new() -> Self {
        Self { counter: 0 }
    }

    /// Records a failed check.
    pub fn record_failure(&mut self) {
        self.counter = if self.counter >= Self::THRESHOLD {
            Self::CEILING
        } else {
            self.counter + 1
        };
    }

    /// Records a successful check.
    pub fn record_success(&mut self) {
        self.counter = 0;
    }

    /// Returns the consecutive failure count.
    #[must_use]
    pub const fn counter(&self) -> u8 {
        self.counter
    }

    /// Returns `true` while the counter is at or below the threshold.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.counter <= Self::THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourth_failure_flips() {
        let mut a = Availability::new();
        for expected in 1..=3 {
            a.record_failure();
            assert_eq!(a.counter(), expected);
            assert!(a.is_available());
        }
        a.record_failure();
        assert_eq!(a.counter(), 4);
        assert!(!a.is_available());
    }

    #[test]
    fn saturates_at_ceiling() {
        let mut a = Availability::new();
        for _ in 0..20 {
            a.record_failure();
        }
        assert_eq!(a.counter(), Availability::CEILING);
    }

    #[test]
    fn success_resets() {
        let mut a = Availability::new();
        for _ in 0..5 {
            a.record_failure();
        }
        a.record_success();
        assert_eq!(a.counter(), 0);
        assert!(a.is_available());
    }
}
