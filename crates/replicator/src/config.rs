/// Every network id except the end-of-entities marker.
pub const MAX_NETWORK_ENTITIES: usize = 0xFFFF;

#[derive(Debug, Clone)]
pub struct ReplicationConfig {
    /// Upper bound on entity records per snapshot, enforced on both ends.
    pub max_entities: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            max_entities: MAX_NETWORK_ENTITIES,
        }
    }
}
