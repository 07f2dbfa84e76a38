//! Territories: spatial spheres owned by one component, used by patrol/health.

use crate::component::ComponentId;
use crate::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub owner_id: ComponentId,
    pub centre: Position,
    pub radius_um: f64,
}

impl Territory {
    pub fn new(owner_id: ComponentId, centre: Position, radius_um: f64) -> Self {
        Self { owner_id, centre, radius_um }
    }

    pub fn contains(&self, point: &Position) -> bool {
        self.centre.distance(point) <= self.radius_um
    }
}
