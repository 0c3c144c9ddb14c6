// SPDX-License-Identifier: Apache-2.0
//! The value registry: a process-local intern pool that canonicalizes
//! participant values so identical observations share identity (§4.B).

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::participant::{ParticipantValue, Polarity};

/// One raw observation to fold into a sub-registry: a channel id and its
/// newly observed bytes.
#[derive(Debug, Clone)]
pub struct RawChange {
    /// The participant id this change was observed on.
    pub participant_id: u16,
    /// The bytes observed.
    pub bytes: Vec<u8>,
}

impl RawChange {
    /// Builds a raw change from a participant id and its observed bytes.
    #[must_use]
    pub const fn new(participant_id: u16, bytes: Vec<u8>) -> Self {
        Self { participant_id, bytes }
    }
}

/// Folds a participant id into its channel index via two's-complement
/// negation (`0 - participantId` in the original source), not a bitwise NOT.
fn channel_index(participant_id: u16) -> usize {
    participant_id.wrapping_neg() as usize
}

/// Per-polarity state: one `current` slot and one interning set per channel.
#[derive(Debug, Default)]
struct SubRegistry {
    /// Last-observed (not yet necessarily interned) bytes for each channel.
    current: Vec<Option<Vec<u8>>>,
    /// Interning pool for each channel: every distinct value ever observed there.
    values: Vec<BTreeSet<Rc<ParticipantValue>>>,
    /// `countDuplicates` diagnostic: repeat-observation count per channel.
    duplicate_counts: Vec<u64>,
    count_duplicates: bool,
}

impl SubRegistry {
    fn new(count_duplicates: bool) -> Self {
        Self {
            count_duplicates,
            ..Self::default()
        }
    }

    fn ensure_len(&mut self, len: usize) {
        if self.current.len() < len {
            self.current.resize(len, None);
            self.values.resize_with(len, BTreeSet::new);
            self.duplicate_counts.resize(len, 0);
        }
    }

    fn apply_changes(&mut self, changes: &[RawChange]) {
        for change in changes {
            let idx = channel_index(change.participant_id);
            self.ensure_len(idx + 1);
            self.current[idx] = Some(change.bytes.clone());
        }
    }

    fn find_current_values(&mut self, polarity: Polarity) -> Vec<Rc<ParticipantValue>> {
        let mut out = Vec::with_capacity(self.current.len());
        for (idx, slot) in self.current.iter().enumerate() {
            let Some(bytes) = slot else { continue };
            let candidate = ParticipantValue::new(idx as u16, bytes.clone(), polarity);
            let interned = if let Some(existing) = self.values[idx].get(&candidate) {
                if self.count_duplicates {
                    self.duplicate_counts[idx] += 1;
                }
                Rc::clone(existing)
            } else {
                let rc = Rc::new(candidate);
                self.values[idx].insert(Rc::clone(&rc));
                rc
            };
            out.push(interned);
        }
        out
    }

    fn duplicate_count(&self, channel: usize) -> u64 {
        self.duplicate_counts.get(channel).copied().unwrap_or(0)
    }
}

/// Canonicalizes participant values observed on both input and output
/// channels (§4.B). Holds one [`SubRegistry`] per polarity, since input and
/// output participant ids occupy disjoint index spaces.
#[derive(Debug)]
pub struct ValueRegistry {
    input: SubRegistry,
    output: SubRegistry,
}

impl ValueRegistry {
    /// Builds an empty registry. `count_duplicates` enables the diagnostic
    /// per-channel repeat-observation counter.
    #[must_use]
    pub fn new(count_duplicates: bool) -> Self {
        Self {
            input: SubRegistry::new(count_duplicates),
            output: SubRegistry::new(count_duplicates),
        }
    }

    fn sub_mut(&mut self, polarity: Polarity) -> &mut SubRegistry {
        match polarity {
            Polarity::Input => &mut self.input,
            Polarity::Output => &mut self.output,
        }
    }

    fn sub(&self, polarity: Polarity) -> &SubRegistry {
        match polarity {
            Polarity::Input => &self.input,
            Polarity::Output => &self.output,
        }
    }

    /// Folds a batch of raw observations into the `current` array for `polarity`.
    pub fn apply_changes(&mut self, polarity: Polarity, changes: &[RawChange]) {
        self.sub_mut(polarity).apply_changes(changes);
    }

    /// Returns the canonical, interned snapshot for `polarity`'s current values.
    pub fn find_current_values(&mut self, polarity: Polarity) -> Vec<Rc<ParticipantValue>> {
        self.sub_mut(polarity).find_current_values(polarity)
    }

    /// `countDuplicates` diagnostic: how many times channel `channel` of
    /// `polarity` was observed to repeat its previous value.
    #[must_use]
    pub fn duplicate_count(&self, polarity: Polarity, channel: usize) -> u64 {
        self.sub(polarity).duplicate_count(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_observations_intern_to_the_same_handle() {
        let mut reg = ValueRegistry::new(false);
        reg.apply_changes(Polarity::Output, &[RawChange::new(1, vec![9, 9])]);
        let a = reg.find_current_values(Polarity::Output);
        reg.apply_changes(Polarity::Output, &[RawChange::new(1, vec![9, 9])]);
        let b = reg.find_current_values(Polarity::Output);
        assert_eq!(a.len(), 1);
        assert!(Rc::ptr_eq(&a[0], &b[0]));
    }

    #[test]
    fn distinct_bytes_intern_to_distinct_handles() {
        let mut reg = ValueRegistry::new(false);
        reg.apply_changes(Polarity::Output, &[RawChange::new(1, vec![1])]);
        let a = reg.find_current_values(Polarity::Output);
        reg.apply_changes(Polarity::Output, &[RawChange::new(1, vec![2])]);
        let b = reg.find_current_values(Polarity::Output);
        assert!(!Rc::ptr_eq(&a[0], &b[0]));
    }

    #[test]
    fn input_and_output_channels_are_independent() {
        let mut reg = ValueRegistry::new(false);
        reg.apply_changes(Polarity::Input, &[RawChange::new(0, vec![5])]);
        reg.apply_changes(Polarity::Output, &[RawChange::new(0, vec![7])]);
        let input_snapshot = reg.find_current_values(Polarity::Input);
        let output_snapshot = reg.find_current_values(Polarity::Output);
        assert_eq!(input_snapshot[0].bytes(), &[5]);
        assert_eq!(output_snapshot[0].bytes(), &[7]);
    }

    #[test]
    fn count_duplicates_tracks_repeats_per_channel_when_enabled() {
        let mut reg = ValueRegistry::new(true);
        reg.apply_changes(Polarity::Output, &[RawChange::new(1, vec![9])]);
        reg.find_current_values(Polarity::Output);
        reg.apply_changes(Polarity::Output, &[RawChange::new(1, vec![9])]);
        reg.find_current_values(Polarity::Output);
        let idx = channel_index(1);
        assert_eq!(reg.duplicate_count(Polarity::Output, idx), 1);
    }

    #[test]
    fn count_duplicates_stays_zero_when_disabled() {
        let mut reg = ValueRegistry::new(false);
        reg.apply_changes(Polarity::Output, &[RawChange::new(1, vec![9])]);
        reg.find_current_values(Polarity::Output);
        reg.apply_changes(Polarity::Output, &[RawChange::new(1, vec![9])]);
        reg.find_current_values(Polarity::Output);
        let idx = channel_index(1);
        assert_eq!(reg.duplicate_count(Polarity::Output, idx), 0);
    }
}
