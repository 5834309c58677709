//! Fixed-capacity buffer for particles simulated outside the grid
//!
//! Slots are assigned by hashing grid positions, so extraction and
//! reintegration never contend for a slot. A saturated buffer simply
//! skips new spawns; that backpressure is the design, not a fault.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_big_array::BigArray;

/// Capacity of the dynamic particle buffer
pub const MAX_DYNAMIC: usize = 1024;

bitflags! {
    /// Lifecycle flags of a dynamic particle slot
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ParticleFlags: u8 {
        /// Slot holds a live particle
        const ACTIVE = 1 << 0;
        /// Spawned by extraction this tick; cleared once the source grid
        /// cell is confirmed and cleared
        const JUST_SPAWNED = 1 << 1;
        /// Launched by an external impulse rather than the force field
        const FROM_MOMENTUM = 1 << 2;
        /// Speed dropped below the settle threshold; awaiting a free cell
        const SETTLING = 1 << 3;
        /// Written back into the grid; the slot clears on the next pass
        const REINTEGRATED = 1 << 4;
    }
}

impl Serialize for ParticleFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for ParticleFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ParticleFlags::from_bits_truncate(u8::deserialize(
            deserializer,
        )?))
    }
}

/// A particle temporarily living outside the grid
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub material_id: u8,
    pub temperature: u16,
    pub flags: ParticleFlags,
    /// Ticks since spawn
    pub lifetime: u32,
}

impl DynamicParticle {
    /// The zeroed state every inactive slot holds
    pub const INACTIVE: DynamicParticle = DynamicParticle {
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
        material_id: 0,
        temperature: 0,
        flags: ParticleFlags::empty(),
        lifetime: 0,
    };

    pub fn is_active(&self) -> bool {
        self.flags.contains(ParticleFlags::ACTIVE)
    }
}

impl Default for DynamicParticle {
    fn default() -> Self {
        DynamicParticle::INACTIVE
    }
}

/// The fixed ring of dynamic particle slots
#[derive(Clone, Serialize, Deserialize)]
pub struct DynamicBuffer {
    #[serde(with = "BigArray")]
    slots: [DynamicParticle; MAX_DYNAMIC],
}

impl DynamicBuffer {
    pub fn new() -> Self {
        Self {
            slots: [DynamicParticle::INACTIVE; MAX_DYNAMIC],
        }
    }

    /// Slot a grid position hashes to
    pub fn slot_for(x: i32, y: i32, width: usize) -> usize {
        (y as usize * width + x as usize) % MAX_DYNAMIC
    }

    pub fn slots(&self) -> &[DynamicParticle] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [DynamicParticle] {
        &mut self.slots
    }

    pub fn get(&self, slot: usize) -> &DynamicParticle {
        &self.slots[slot]
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_active()).count()
    }

    pub fn clear_slot(&mut self, slot: usize) {
        self.slots[slot] = DynamicParticle::INACTIVE;
    }

    /// Launch a particle from an external impulse (tools, debris).
    ///
    /// Returns false without spawning when the hashed slot is taken: the
    /// fixed capacity backpressure also applies to external spawns.
    pub fn spawn(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        material_id: u8,
        temperature: u16,
        width: usize,
    ) -> bool {
        let slot = Self::slot_for(position.x.floor() as i32, position.y.floor() as i32, width);
        if self.slots[slot].is_active() {
            return false;
        }
        self.slots[slot] = DynamicParticle {
            position,
            velocity,
            material_id,
            temperature,
            flags: ParticleFlags::ACTIVE | ParticleFlags::FROM_MOMENTUM,
            lifetime: 0,
        };
        true
    }
}

impl Default for DynamicBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinderbox_simulation::MaterialId;

    #[test]
    fn test_new_buffer_is_inactive_and_zeroed() {
        let buffer = DynamicBuffer::new();
        assert_eq!(buffer.active_count(), 0);
        for slot in buffer.slots() {
            assert_eq!(*slot, DynamicParticle::INACTIVE);
        }
    }

    #[test]
    fn test_slot_hashing() {
        assert_eq!(DynamicBuffer::slot_for(0, 0, 2048), 0);
        assert_eq!(DynamicBuffer::slot_for(5, 0, 2048), 5);
        // (y * width + x) mod capacity
        assert_eq!(DynamicBuffer::slot_for(0, 1, 2048), 2048 % MAX_DYNAMIC);
        assert_eq!(DynamicBuffer::slot_for(3, 2, 100), 203 % MAX_DYNAMIC);
    }

    #[test]
    fn test_spawn_takes_hashed_slot() {
        let mut buffer = DynamicBuffer::new();
        let ok = buffer.spawn(
            Vec2::new(5.5, 0.5),
            Vec2::new(0.0, 2.0),
            MaterialId::SAND,
            293,
            64,
        );
        assert!(ok);

        let slot = DynamicBuffer::slot_for(5, 0, 64);
        let particle = buffer.get(slot);
        assert!(particle.is_active());
        assert!(particle.flags.contains(ParticleFlags::FROM_MOMENTUM));
        assert_eq!(particle.material_id, MaterialId::SAND);
    }

    #[test]
    fn test_spawn_skipped_when_slot_taken() {
        let mut buffer = DynamicBuffer::new();
        assert!(buffer.spawn(Vec2::new(5.5, 0.5), Vec2::ZERO, MaterialId::SAND, 293, 64));
        assert!(!buffer.spawn(Vec2::new(5.2, 0.8), Vec2::ZERO, MaterialId::DIRT, 293, 64));
        assert_eq!(buffer.active_count(), 1);
        // The original occupant survives
        let slot = DynamicBuffer::slot_for(5, 0, 64);
        assert_eq!(buffer.get(slot).material_id, MaterialId::SAND);
    }

    #[test]
    fn test_clear_slot_zeroes() {
        let mut buffer = DynamicBuffer::new();
        buffer.spawn(Vec2::new(1.5, 1.5), Vec2::ONE, MaterialId::SAND, 400, 64);
        let slot = DynamicBuffer::slot_for(1, 1, 64);
        buffer.clear_slot(slot);
        assert_eq!(*buffer.get(slot), DynamicParticle::INACTIVE);
    }

    #[test]
    fn test_flags_serde_round_trip_bits() {
        let flags = ParticleFlags::ACTIVE | ParticleFlags::SETTLING;
        assert_eq!(ParticleFlags::from_bits_truncate(flags.bits()), flags);
    }
}
