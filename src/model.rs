use rand::Rng;
use serde::{Deserialize, Serialize};

/// Starting position of every entity.
pub const INIT_POSITION: f64 = 0.5;

/// Member of population A or B.
///
/// The latent value is fixed at creation. The position is double-buffered:
/// updates write `next_position` and only [`Population::commit`] moves it
/// into `current_position`.
#[derive(Debug, Clone)]
pub struct Entity {
    id: usize,
    latent_value: f64,
    current_position: f64,
    next_position: f64,
}

impl Entity {
    pub fn new(id: usize, latent_value: f64) -> Self {
        Self {
            id,
            latent_value,
            current_position: INIT_POSITION,
            next_position: INIT_POSITION,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn latent_value(&self) -> f64 {
        self.latent_value
    }

    pub fn current_position(&self) -> f64 {
        self.current_position
    }

    pub fn next_position(&self) -> f64 {
        self.next_position
    }

    /// Overwrite the next position, clamped into `[0, 1]`.
    pub fn set_next_position(&mut self, position: f64) {
        self.next_position = position.clamp(0.0, 1.0);
    }

    fn commit(&mut self) {
        self.current_position = self.next_position;
    }

    #[cfg(test)]
    pub fn with_position(id: usize, latent_value: f64, position: f64) -> Self {
        Self {
            id,
            latent_value,
            current_position: position,
            next_position: position,
        }
    }
}

/// Fixed-size, positionally indexed sequence of entities.
#[derive(Debug, Clone)]
pub struct Population {
    ent_vec: Vec<Entity>,
}

impl Population {
    /// Create `n` entities with ids `0..n` and uniform random latent values.
    pub fn initialize<R: Rng>(n: usize, rng: &mut R) -> Self {
        let ent_vec = (0..n)
            .map(|id| Entity::new(id, rng.random::<f64>()))
            .collect();
        Self { ent_vec }
    }

    pub fn len(&self) -> usize {
        self.ent_vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ent_vec.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.ent_vec
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.ent_vec
    }

    /// Copy every next position into the current position.
    pub fn commit(&mut self) {
        self.ent_vec.iter_mut().for_each(Entity::commit);
    }

    pub fn views(&self) -> Vec<EntityView> {
        self.ent_vec.iter().map(EntityView::from).collect()
    }

    #[cfg(test)]
    pub fn from_entities(ent_vec: Vec<Entity>) -> Self {
        Self { ent_vec }
    }
}

/// One sampled comparison, by position in each population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub a_id: usize,
    pub b_id: usize,
}

/// Read-only copy of an entity's positions handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: usize,
    pub current_position: f64,
    pub next_position: f64,
}

impl From<&Entity> for EntityView {
    fn from(ent: &Entity) -> Self {
        Self {
            id: ent.id,
            current_position: ent.current_position,
            next_position: ent.next_position,
        }
    }
}
