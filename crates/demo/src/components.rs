use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use ecs_replicator::{ComponentFlags, EntityHandle, MemoryWorld, RegistryError, TypeRegistry};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoComponent {
    Position,
    Velocity,
    Health,
    Stunned,
    /// Client-side only, never replicated.
    Selected,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Health {
    pub current: u16,
    pub max: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Stunned {
    pub ticks_left: u8,
}

pub fn registry() -> Result<TypeRegistry<DemoComponent>, RegistryError> {
    TypeRegistry::with_components([
        (DemoComponent::Position, size_of::<Vec3>(), ComponentFlags::empty()),
        (DemoComponent::Velocity, size_of::<Vec3>(), ComponentFlags::empty()),
        (DemoComponent::Health, size_of::<Health>(), ComponentFlags::empty()),
        (DemoComponent::Stunned, size_of::<Stunned>(), ComponentFlags::ENABLEABLE),
    ])
}

pub fn read<T: Pod>(
    world: &MemoryWorld<DemoComponent>,
    entity: EntityHandle,
    kind: DemoComponent,
) -> Option<T> {
    let bytes = world.get(entity, kind)?;
    bytemuck::try_pod_read_unaligned(bytes).ok()
}

pub fn write<T: Pod>(
    world: &mut MemoryWorld<DemoComponent>,
    entity: EntityHandle,
    kind: DemoComponent,
    value: &T,
) {
    world.insert(entity, kind, bytemuck::bytes_of(value));
}
