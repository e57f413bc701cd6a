use crate::problem::pdp::PDPInstance;
use crate::problem::NodeId;

pub mod construction;
pub mod cost;
pub mod neighborhood;

/// Successor-linked chains, one per vehicle, covering every pickup and delivery event.
///
/// `next` is indexed by node id (events first, then one slot per vehicle), `prev`, `time` and
/// `owner` by event id. Cloning yields a fully independent copy.
#[derive(Clone)]
pub struct Assignment<'a> {
    pub(crate) instance: &'a PDPInstance,
    pub(crate) next: Vec<Option<NodeId>>,
    prev: Vec<NodeId>,
    pub(crate) time: Vec<usize>,
    pub(crate) owner: Vec<usize>,
}

impl<'a> Assignment<'a> {
    /// All vehicles idle. Only a valid state when the instance has no tasks.
    pub fn new(instance: &'a PDPInstance) -> Self {
        Self {
            instance,
            next: vec![None; instance.num_nodes()],
            prev: vec![0; instance.num_events()],
            time: vec![0; instance.num_events()],
            owner: vec![0; instance.num_events()],
        }
    }

    pub fn instance(&self) -> &'a PDPInstance {
        self.instance
    }

    #[inline(always)]
    pub fn next(&self, node: NodeId) -> Option<NodeId> {
        self.next[node]
    }

    #[inline(always)]
    pub fn time(&self, event: NodeId) -> usize {
        self.time[event]
    }

    #[inline(always)]
    pub fn owner(&self, event: NodeId) -> usize {
        self.owner[event]
    }

    pub fn first_event(&self, vehicle: usize) -> Option<NodeId> {
        self.next[self.instance.vehicle_slot(vehicle)]
    }

    pub fn is_idle(&self, vehicle: usize) -> bool {
        self.first_event(vehicle).is_none()
    }

    pub fn iter_route(&self, vehicle: usize) -> RouteIter<'_, 'a> {
        RouteIter {
            assignment: self,
            current: self.first_event(vehicle),
            remaining: self.instance.num_events(),
        }
    }

    pub fn route(&self, vehicle: usize) -> Vec<NodeId> {
        self.iter_route(vehicle).collect()
    }

    pub fn route_len(&self, vehicle: usize) -> usize {
        self.iter_route(vehicle).count()
    }

    pub fn iter_non_idle_vehicles(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.instance.num_vehicles).filter(move |&v| !self.is_idle(v))
    }

    /// Replaces the chain of `vehicle` by `events` and reindexes it.
    pub fn set_route(&mut self, vehicle: usize, events: &[NodeId]) {
        let mut prev = self.instance.vehicle_slot(vehicle);
        for &event in events {
            self.link(prev, Some(event));
            prev = event;
        }
        self.link(prev, None);
        self.update_time(vehicle);
    }

    /// Renumbers `time` along the chain of `vehicle` starting at 1 and claims its events.
    pub fn update_time(&mut self, vehicle: usize) {
        let mut current = self.first_event(vehicle);
        let mut position = 1;
        while let Some(event) = current {
            if position > self.instance.num_events() {
                break;
            }
            self.time[event] = position;
            self.owner[event] = vehicle;
            position += 1;
            current = self.next[event];
        }
    }

    /// Node whose successor is `event`: an event or the vehicle slot.
    #[inline(always)]
    pub fn pred(&self, event: NodeId) -> NodeId {
        self.prev[event]
    }

    #[inline(always)]
    pub(crate) fn link(&mut self, from: NodeId, to: Option<NodeId>) {
        self.next[from] = to;
        if let Some(to) = to {
            self.prev[to] = from;
        }
    }

    /// Unlinks the pickup at `pickup` and its delivery, closing the gap(s) they leave behind.
    /// Times are not touched; callers reindex the affected chain.
    pub(crate) fn remove_pd(&mut self, pickup: NodeId) {
        let delivery = self.instance.pair_of(pickup);
        let p_pred = self.pred(pickup);
        let d_pred = self.pred(delivery);
        let d_succ = self.next[delivery];
        if self.next[pickup] == Some(delivery) {
            self.link(p_pred, d_succ);
        } else {
            self.link(p_pred, self.next[pickup]);
            self.link(d_pred, d_succ);
        }
        self.link(pickup, None);
        self.link(delivery, None);
    }

    /// Puts an unlinked pickup/delivery pair at the head of the chain of `vehicle`.
    pub(crate) fn insert_pd_at_front(&mut self, pickup: NodeId, vehicle: usize) {
        let delivery = self.instance.pair_of(pickup);
        let slot = self.instance.vehicle_slot(vehicle);
        let old_first = self.next[slot];
        self.link(slot, Some(pickup));
        self.link(pickup, Some(delivery));
        self.link(delivery, old_first);
        self.update_time(vehicle);
    }

    /// Exchanges the chain positions of `a` and `b`, where `a` comes strictly before `b` on the
    /// same chain. Times are not touched.
    pub(crate) fn swap_events(&mut self, a: NodeId, b: NodeId) {
        debug_assert_eq!(self.owner[a], self.owner[b]);
        debug_assert!(self.time[a] < self.time[b]);
        let a_pred = self.pred(a);
        let b_succ = self.next[b];
        if self.next[a] == Some(b) {
            self.link(a_pred, Some(b));
            self.link(b, Some(a));
            self.link(a, b_succ);
        } else {
            let a_succ = self.next[a];
            let b_pred = self.pred(b);
            self.link(a_pred, Some(b));
            self.link(b, a_succ);
            self.link(b_pred, Some(a));
            self.link(a, b_succ);
        }
    }
}

pub struct RouteIter<'s, 'a> {
    assignment: &'s Assignment<'a>,
    current: Option<NodeId>,
    remaining: usize,
}

impl<'s, 'a> Iterator for RouteIter<'s, 'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.current?;
        if !self.assignment.instance.is_event(current) {
            return None;
        }
        self.remaining -= 1;
        self.current = self.assignment.next[current];
        Some(current)
    }
}
