// State carried between time steps of the storage model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachState {
    pub water_level: f64,
}

impl ReachState {
    pub fn new(water_level: f64) -> Self {
        ReachState { water_level }
    }

    pub fn update(&mut self, next_level: f64) {
        self.water_level = next_level;
    }
}
