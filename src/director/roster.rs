//! Queued / current / done bookkeeping for one round
//!
//! Every empire is in exactly one of the three collections, and at most one
//! is current.

use std::collections::VecDeque;

use crate::core::types::FactionId;
use crate::empire::EmpireRef;

#[derive(Debug, Default)]
pub struct EmpireRoster {
    queued: VecDeque<EmpireRef>,
    current: Option<EmpireRef>,
    done: Vec<EmpireRef>,
}

impl EmpireRoster {
    /// All empires queued in the given order
    pub fn new(empires: Vec<EmpireRef>) -> Self {
        Self {
            queued: empires.into(),
            current: None,
            done: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&EmpireRef> {
        self.current.as_ref()
    }

    pub fn queued(&self) -> impl Iterator<Item = FactionId> + '_ {
        self.queued.iter().map(|e| e.faction())
    }

    pub fn done(&self) -> impl Iterator<Item = FactionId> + '_ {
        self.done.iter().map(|e| e.faction())
    }

    pub fn len(&self) -> usize {
        self.queued.len() + self.done.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next queued empire current
    ///
    /// Returns `None` when the round is over or an empire is still current.
    pub fn promote_next(&mut self) -> Option<EmpireRef> {
        if self.current.is_some() {
            return None;
        }
        self.current = self.queued.pop_front();
        self.current.clone()
    }

    /// Move the current empire to done
    pub fn finish_current(&mut self) -> Option<FactionId> {
        let finished = self.current.take()?;
        let faction = finished.faction();
        self.done.push(finished);
        Some(faction)
    }

    /// Requeue every empire still alive, lowest faction id first
    pub fn start_round(&mut self, living: &[FactionId]) {
        let mut all: Vec<EmpireRef> = self
            .done
            .drain(..)
            .chain(self.current.take())
            .chain(self.queued.drain(..))
            .filter(|e| living.contains(&e.faction()))
            .collect();
        all.sort_by_key(|e| e.faction());
        self.queued = all.into();
    }

    /// No faction appears twice across queued, current and done
    pub fn is_partition(&self) -> bool {
        let mut seen: Vec<FactionId> = self
            .queued()
            .chain(self.current.iter().map(|e| e.faction()))
            .chain(self.done())
            .collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        seen.len() == total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tokio::sync::mpsc;

    fn roster(n: u8) -> EmpireRoster {
        let empires = (1..=n)
            .map(|id| {
                let (tx, _rx) = mpsc::unbounded_channel();
                EmpireRef::new(FactionId::new(id), tx)
            })
            .collect();
        EmpireRoster::new(empires)
    }

    #[test]
    fn test_round_visits_in_order() {
        let mut r = roster(3);
        let mut order = Vec::new();
        while let Some(empire) = r.promote_next() {
            order.push(empire.faction().0);
            assert!(r.promote_next().is_none());
            r.finish_current();
        }
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(r.done().count(), 3);
    }

    #[test]
    fn test_start_round_drops_dead_factions() {
        let mut r = roster(4);
        while r.promote_next().is_some() {
            r.finish_current();
        }
        r.start_round(&[FactionId::new(1), FactionId::new(3)]);
        assert_eq!(r.queued().collect::<Vec<_>>(), vec![FactionId::new(1), FactionId::new(3)]);
        assert_eq!(r.done().count(), 0);
    }

    proptest! {
        #[test]
        fn prop_roster_stays_partitioned(n in 1u8..=4, steps in proptest::collection::vec(0u8..3, 0..30)) {
            let mut r = roster(n);
            for step in steps {
                match step {
                    0 => { r.promote_next(); }
                    1 => { r.finish_current(); }
                    _ => {
                        let living: Vec<FactionId> = (1..=n).map(FactionId::new).collect();
                        r.start_round(&living);
                    }
                }
                prop_assert!(r.is_partition());
                prop_assert!(r.current().into_iter().count() <= 1);
                prop_assert_eq!(r.len(), n as usize);
            }
        }
    }
}
