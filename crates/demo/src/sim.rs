use std::sync::Arc;

use anyhow::{Result, bail};
use ecs_replicator::{
    DecodeSummary, EncodeError, EntityHandle, MemoryWorld, ReplicationConfig, SnapshotDecoder,
    SnapshotEncoder,
};
use glam::Vec3;

use crate::components::{self, DemoComponent, Health, Stunned};
use crate::config::DemoConfig;

const REPLICATED: [DemoComponent; 4] = [
    DemoComponent::Position,
    DemoComponent::Velocity,
    DemoComponent::Health,
    DemoComponent::Stunned,
];

/// Sender and receiver worlds joined by an in-memory snapshot stream.
pub struct Simulation {
    config: DemoConfig,
    sender: MemoryWorld<DemoComponent>,
    receiver: MemoryWorld<DemoComponent>,
    encoder: SnapshotEncoder<EntityHandle, DemoComponent>,
    decoder: SnapshotDecoder<EntityHandle, DemoComponent>,
    buffer: Vec<u8>,
    tracked: Vec<EntityHandle>,
    spawned: u32,
    pass: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct PassStats {
    pub bytes: usize,
    pub entities: usize,
    pub summary: DecodeSummary,
}

impl Simulation {
    pub fn new(config: DemoConfig) -> Result<Self> {
        let registry = Arc::new(components::registry()?);
        for descriptor in registry.descriptors() {
            log::debug!(
                "component {:?} as type {} ({} bytes)",
                descriptor.kind,
                descriptor.type_id,
                descriptor.size
            );
        }

        let replication = ReplicationConfig::default();
        let mut sim = Self {
            buffer: vec![0u8; config.buffer_size],
            sender: MemoryWorld::new(),
            receiver: MemoryWorld::new(),
            encoder: SnapshotEncoder::with_config(registry.clone(), replication.clone()),
            decoder: SnapshotDecoder::with_config(registry, replication),
            tracked: Vec::with_capacity(config.entity_count),
            spawned: 0,
            pass: 0,
            config,
        };
        for _ in 0..sim.config.entity_count {
            sim.spawn_unit();
        }
        Ok(sim)
    }

    pub fn pass(&self) -> u32 {
        self.pass
    }

    fn spawn_unit(&mut self) -> EntityHandle {
        let seed = self.spawned;
        self.spawned += 1;

        let entity = self.sender.spawn();
        let position = Vec3::new(seed as f32 * 2.0, 0.0, 0.0);
        let velocity = Vec3::new(1.0, 0.0, 0.5 * (seed % 3) as f32);
        components::write(&mut self.sender, entity, DemoComponent::Position, &position);
        if seed % 5 != 0 {
            components::write(&mut self.sender, entity, DemoComponent::Velocity, &velocity);
        }
        let health = Health {
            current: 100,
            max: 100,
        };
        components::write(&mut self.sender, entity, DemoComponent::Health, &health);
        if seed % 4 == 0 {
            self.sender.insert(entity, DemoComponent::Selected, &[1]);
        }

        self.tracked.push(entity);
        entity
    }

    /// Advances the sender world by one tick.
    pub fn step(&mut self) {
        self.pass += 1;
        let dt = 1.0 / self.config.tick_rate.max(1) as f32;

        let every = self.config.despawn_every;
        if every > 0 && self.pass % every == 0 && !self.tracked.is_empty() {
            let oldest = self.tracked.remove(0);
            self.sender.despawn(oldest);
            let fresh = self.spawn_unit();
            log::debug!("pass {}: replaced {:?} with {:?}", self.pass, oldest, fresh);
        }

        let sender = &mut self.sender;
        for &entity in &self.tracked {
            let velocity = components::read::<Vec3>(sender, entity, DemoComponent::Velocity);
            let position = components::read::<Vec3>(sender, entity, DemoComponent::Position);
            if let (Some(velocity), Some(position)) = (velocity, position) {
                let moved = position + velocity * dt;
                components::write(sender, entity, DemoComponent::Position, &moved);
            }

            let health = components::read::<Health>(sender, entity, DemoComponent::Health);
            if let Some(mut health) = health {
                health.current = health.current.saturating_sub(1);
                components::write(sender, entity, DemoComponent::Health, &health);
            }

            let stun = (self.pass + entity.id()) % 4 == 0;
            match components::read::<Stunned>(sender, entity, DemoComponent::Stunned) {
                None if stun => {
                    let fresh = Stunned { ticks_left: 3 };
                    components::write(sender, entity, DemoComponent::Stunned, &fresh);
                }
                None => {}
                Some(mut stunned) => {
                    stunned.ticks_left = stunned.ticks_left.saturating_sub(1);
                    components::write(sender, entity, DemoComponent::Stunned, &stunned);
                    sender.toggle(entity, DemoComponent::Stunned, stun);
                }
            }
        }
    }

    /// Encodes the sender and applies the snapshot to the receiver.
    pub fn sync(&mut self) -> Result<PassStats> {
        let bytes = loop {
            let encoded = self
                .encoder
                .encode(&self.sender, &self.tracked, &mut self.buffer);
            match encoded {
                Ok(written) => break written,
                Err(EncodeError::BufferTooSmall { entities_written, .. }) => {
                    let needed = self.encoder.encoded_len(&self.sender, &self.tracked)?;
                    log::warn!(
                        "snapshot buffer of {} bytes held {} of {} entities, growing to {}",
                        self.buffer.len(),
                        entities_written,
                        self.tracked.len(),
                        needed
                    );
                    self.buffer.resize(needed, 0);
                }
                Err(e) => return Err(e.into()),
            }
        };

        let summary = self
            .decoder
            .decode(&mut self.receiver, &self.buffer[..bytes])?;

        Ok(PassStats {
            bytes,
            entities: self.tracked.len(),
            summary,
        })
    }

    /// Checks that every replicated component the sender shows arrived intact.
    pub fn verify(&self) -> Result<()> {
        if self.receiver.entity_count() != self.tracked.len() {
            bail!(
                "receiver holds {} entities, sender replicates {}",
                self.receiver.entity_count(),
                self.tracked.len()
            );
        }

        for &entity in &self.tracked {
            let Some(network_id) = self.encoder.entities().get(entity) else {
                bail!("entity {:?} was never assigned a network id", entity);
            };
            let Some(mirror) = self.decoder.entities().resolve(network_id) else {
                bail!("network id {} has no mirror", network_id);
            };

            for kind in REPLICATED {
                let sent = self.sender.slot(entity, kind).filter(|slot| slot.enabled);
                let received = self.receiver.slot(mirror, kind).filter(|slot| slot.enabled);
                if sent.map(|slot| &slot.data) != received.map(|slot| &slot.data) {
                    bail!(
                        "{:?} of entity {:?} diverged on mirror {:?}",
                        kind,
                        entity,
                        mirror
                    );
                }
            }
            if self.receiver.get(mirror, DemoComponent::Selected).is_some() {
                bail!("local-only component leaked to mirror {:?}", mirror);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_tracks_sender() {
        let mut sim = Simulation::new(DemoConfig {
            entity_count: 8,
            buffer_size: 16,
            ..Default::default()
        })
        .unwrap();

        for _ in 0..12 {
            sim.step();
            sim.sync().unwrap();
            sim.verify().unwrap();
        }
        assert!(sim.buffer.len() > 16);
    }

    #[test]
    fn replaced_entity_is_destroyed() {
        let mut sim = Simulation::new(DemoConfig {
            entity_count: 4,
            despawn_every: 1,
            ..Default::default()
        })
        .unwrap();
        sim.sync().unwrap();

        sim.step();
        let stats = sim.sync().unwrap();
        assert_eq!(stats.summary.destroyed, 1);
        assert_eq!(stats.summary.created, 1);
        assert_eq!(stats.entities, 4);
        sim.verify().unwrap();
    }
}
