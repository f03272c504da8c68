#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub entity_count: usize,
    pub passes: u32,
    pub buffer_size: usize,
    pub despawn_every: u32,
    pub tick_rate: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            entity_count: 16,
            passes: 10,
            buffer_size: 1200,
            despawn_every: 3,
            tick_rate: 20,
        }
    }
}
