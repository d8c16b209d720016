//! Pending unit production
//!
//! Each faction has at most one order in flight. Orders are keyed by the
//! absolute turn on which the unit appears.

use crate::core::types::{FactionId, Turn};
use crate::unit::Archetype;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionOrder {
    pub faction: FactionId,
    pub archetype: Archetype,
    pub target_turn: Turn,
}

#[derive(Debug, Clone, Default)]
pub struct ProductionQueue {
    orders: Vec<ProductionOrder>,
}

impl ProductionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `faction` already has an order pending
    pub fn is_busy(&self, faction: FactionId) -> bool {
        self.orders.iter().any(|o| o.faction == faction)
    }

    pub fn pending(&self, faction: FactionId) -> Option<&ProductionOrder> {
        self.orders.iter().find(|o| o.faction == faction)
    }

    /// Add an order; returns false if the faction is already producing
    pub fn enqueue(&mut self, order: ProductionOrder) -> bool {
        if self.is_busy(order.faction) {
            return false;
        }
        self.orders.push(order);
        true
    }

    /// Remove and return the orders due on `turn`
    ///
    /// Only orders for later turns stay queued.
    pub fn take_due(&mut self, turn: Turn) -> Vec<ProductionOrder> {
        let (due, rest): (Vec<_>, Vec<_>) = self
            .orders
            .drain(..)
            .filter(|o| o.target_turn >= turn)
            .partition(|o| o.target_turn == turn);
        self.orders = rest;
        due
    }

    /// Drop whatever an eliminated faction had ordered
    pub fn discard_faction(&mut self, faction: FactionId) {
        self.orders.retain(|o| o.faction != faction);
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(faction: u8, target_turn: Turn) -> ProductionOrder {
        ProductionOrder {
            faction: FactionId::new(faction),
            archetype: Archetype::Archer,
            target_turn,
        }
    }

    #[test]
    fn test_one_order_per_faction() {
        let mut queue = ProductionQueue::new();
        assert!(queue.enqueue(order(1, 6)));
        assert!(!queue.enqueue(order(1, 7)));
        assert!(queue.enqueue(order(2, 4)));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_take_due_keeps_future_orders() {
        let mut queue = ProductionQueue::new();
        queue.enqueue(order(1, 6));
        queue.enqueue(order(2, 4));
        assert!(queue.take_due(3).is_empty());

        let due = queue.take_due(4);
        assert_eq!(due, vec![order(2, 4)]);
        assert!(queue.is_busy(FactionId::new(1)));
        assert!(!queue.is_busy(FactionId::new(2)));
    }

    #[test]
    fn test_take_due_drops_stale_orders() {
        let mut queue = ProductionQueue::new();
        queue.enqueue(order(1, 2));
        assert!(queue.take_due(5).is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_discard_faction() {
        let mut queue = ProductionQueue::new();
        queue.enqueue(order(1, 6));
        queue.discard_faction(FactionId::new(1));
        assert!(queue.pending(FactionId::new(1)).is_none());
    }
}
