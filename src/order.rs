//! Insertion-order list.
//!
//! One doubly linked list threading every live entry, head = earliest
//! surviving insertion, tail = latest. Bucket membership is invisible
//! here: rehashing rewrites chain links and leaves this list untouched,
//! which is what makes iteration order stable across growth.

use slotmap::DefaultKey;

use crate::slots::Slots;

/// Endpoints of the order list. The links themselves live in the entries.
#[derive(Debug, Default)]
pub(crate) struct OrderList {
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl OrderList {
    pub(crate) fn new() -> Self {
        OrderList { head: None, tail: None }
    }

    pub(crate) fn head(&self) -> Option<DefaultKey> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<DefaultKey> {
        self.tail
    }

    /// Append a freshly created entry at the tail. New keys always enter
    /// here; nothing ever inserts into the middle of the list.
    pub(crate) fn push_back<K, V>(&mut self, slots: &mut Slots<K, V>, k: DefaultKey) {
        match self.tail {
            Some(t) => {
                slots[t].order_next = Some(k);
                slots[k].order_prev = Some(t);
            }
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    /// Unlink `k` wherever it sits (head, interior, or tail), patching its
    /// neighbors and the endpoints. O(1); `k` must be live.
    pub(crate) fn unlink<K, V>(&mut self, slots: &mut Slots<K, V>, k: DefaultKey) {
        let (prev, next) = {
            let e = &slots[k];
            (e.order_prev, e.order_next)
        };
        match prev {
            Some(p) => slots[p].order_next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => slots[n].order_prev = prev,
            None => self.tail = prev,
        }
        let e = &mut slots[k];
        e.order_prev = None;
        e.order_next = None;
    }

    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }
}
