//! Fixed-capacity slot pool for short-lived effects.
//!
//! - Capacity is fixed at construction; nothing allocates afterwards
//! - A spawn takes the first inactive slot, or does nothing when full
//! - A slot retires as soon as its age passes its lifetime and is
//!   immediately reusable

use super::lifecycle::LifecycleCurve;

/// One reusable effect slot.
#[derive(Clone, Debug)]
pub struct EffectSlot<P> {
    pub active: bool,
    /// Seconds since spawn. Never decreases until the slot is respawned.
    pub age: f32,
    /// Seconds the effect lives.
    pub lifetime: f32,
    /// Per-instance path/shape parameters from the last spawn.
    pub params: Option<P>,
}

impl<P> Default for EffectSlot<P> {
    fn default() -> Self {
        Self {
            active: false,
            age: 0.0,
            lifetime: 0.0,
            params: None,
        }
    }
}

impl<P> EffectSlot<P> {
    /// Fraction of the lifetime elapsed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Pool of effect slots for one effect category.
pub struct EntityPool<P> {
    slots: Vec<EffectSlot<P>>,
    curve: LifecycleCurve,
    active_count: usize,
}

impl<P> EntityPool<P> {
    /// Create a pool with `capacity` inactive slots.
    pub fn new(capacity: usize, curve: LifecycleCurve) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, EffectSlot::default);
        Self {
            slots,
            curve,
            active_count: 0,
        }
    }

    /// Activate the first free slot. Returns its index, or `None` when every
    /// slot is busy; a full pool is an expected outcome, not an error.
    pub fn spawn(&mut self, lifetime: f32, params: P) -> Option<usize> {
        let index = self.slots.iter().position(|s| !s.active)?;

        let slot = &mut self.slots[index];
        slot.active = true;
        slot.age = 0.0;
        slot.lifetime = lifetime;
        slot.params = Some(params);
        self.active_count += 1;

        log::trace!("Spawned effect in slot {} (lifetime {:.2}s)", index, lifetime);
        Some(index)
    }

    /// Age every active slot by `dt` and retire expired ones.
    /// Returns the number of slots retired this call.
    pub fn update(&mut self, dt: f32) -> usize {
        let dt = dt.max(0.0);
        let mut retired = 0;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.active {
                continue;
            }
            slot.age += dt;
            if slot.age > slot.lifetime {
                slot.active = false;
                retired += 1;
                log::trace!("Retired effect in slot {}", index);
            }
        }

        self.active_count -= retired;
        retired
    }

    /// Opacity of a slot from the lifecycle curve; 0 for inactive slots.
    pub fn opacity(&self, index: usize) -> f32 {
        match self.slots.get(index) {
            Some(slot) if slot.active => self.curve.opacity(slot.age, slot.lifetime),
            _ => 0.0,
        }
    }

    /// Force every slot inactive.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
        self.active_count = 0;
    }

    pub fn get(&self, index: usize) -> Option<&EffectSlot<P>> {
        self.slots.get(index)
    }

    /// Active slots with their indices.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &EffectSlot<P>)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn is_full(&self) -> bool {
        self.active_count == self.slots.len()
    }

    pub fn curve(&self) -> &LifecycleCurve {
        &self.curve
    }
}
