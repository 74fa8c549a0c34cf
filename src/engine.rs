use crate::config::ModelConfig;
use crate::model::{EntityView, Pair, Population};
use crate::rule::{Decision, apply_feedback};
use crate::sampler::PairSampler;
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// Snapshot handed to renderers at the end of each tick.
///
/// Positions are captured after all updates of the tick and before the
/// commit, so `current_position` is the position at tick start and
/// `next_position` the one the tick moves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub pairs: Vec<Pair>,
    pub a: Vec<EntityView>,
    pub b: Vec<EntityView>,
}

/// Simulation engine.
///
/// Owns both populations and the random number generator. All mutation goes
/// through [`Simulation::tick`].
pub struct Simulation {
    cfg: ModelConfig,
    pop_a: Population,
    pop_b: Population,
    sampler: PairSampler,
    rng: ChaCha12Rng,
    n_ticks: u64,
}

impl Simulation {
    /// Create a new `Simulation` with fresh populations drawn from `rng`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(cfg: ModelConfig, mut rng: ChaCha12Rng) -> Result<Self> {
        cfg.validate().context("failed to validate model config")?;

        let sampler =
            PairSampler::new(cfg.n_as, cfg.n_bs).context("failed to construct pair sampler")?;

        let pop_a = Population::initialize(cfg.n_as, &mut rng);
        let pop_b = Population::initialize(cfg.n_bs, &mut rng);

        Ok(Self {
            cfg,
            pop_a,
            pop_b,
            sampler,
            rng,
            n_ticks: 0,
        })
    }

    pub fn from_seed(cfg: ModelConfig, seed: u64) -> Result<Self> {
        Self::new(cfg, ChaCha12Rng::seed_from_u64(seed))
    }

    pub fn from_os_rng(cfg: ModelConfig) -> Result<Self> {
        let rng = ChaCha12Rng::try_from_os_rng().context("failed to seed rng from os")?;
        Self::new(cfg, rng)
    }

    pub fn cfg(&self) -> &ModelConfig {
        &self.cfg
    }

    pub fn pop_a(&self) -> &Population {
        &self.pop_a
    }

    pub fn pop_b(&self) -> &Population {
        &self.pop_b
    }

    /// Number of completed ticks.
    pub fn n_ticks(&self) -> u64 {
        self.n_ticks
    }

    /// Run one tick: sample all pairs, apply the update rule to each pair in
    /// order, snapshot, then commit.
    pub fn tick(&mut self) -> Frame {
        let pairs = self.sample_pairs();

        let n_moved = self.apply_pairs(&pairs);

        let frame = Frame {
            tick: self.n_ticks,
            pairs,
            a: self.pop_a.views(),
            b: self.pop_b.views(),
        };

        self.commit();

        log::debug!(
            "tick {}: {} pairs, {n_moved} moved",
            frame.tick,
            frame.pairs.len()
        );

        frame
    }

    fn sample_pairs(&mut self) -> Vec<Pair> {
        (0..self.cfg.n_pairs)
            .map(|_| self.sampler.sample(&self.pop_a, &self.pop_b, &mut self.rng))
            .collect()
    }

    fn apply_pairs(&mut self, pairs: &[Pair]) -> usize {
        let mut n_moved = 0;
        for pair in pairs {
            let ent_a = &mut self.pop_a.entities_mut()[pair.a_id];
            let ent_b = &mut self.pop_b.entities_mut()[pair.b_id];
            let decision = apply_feedback(ent_a, ent_b, self.cfg.learning_rate, &mut self.rng);
            if decision != Decision::Hold {
                n_moved += 1;
            }
        }
        n_moved
    }

    fn commit(&mut self) {
        self.pop_a.commit();
        self.pop_b.commit();
        self.n_ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, INIT_POSITION};
    use rand::Rng;

    fn small_cfg() -> ModelConfig {
        ModelConfig {
            n_as: 2,
            n_bs: 2,
            n_pairs: 2,
            learning_rate: 0.2,
        }
    }

    fn with_populations(cfg: ModelConfig, pop_a: Population, pop_b: Population) -> Simulation {
        let mut sim = Simulation::from_seed(cfg, 0).unwrap();
        sim.pop_a = pop_a;
        sim.pop_b = pop_b;
        sim
    }

    fn all_positions(sim: &Simulation) -> Vec<f64> {
        sim.pop_a
            .entities()
            .iter()
            .chain(sim.pop_b.entities())
            .flat_map(|ent| [ent.current_position(), ent.next_position()])
            .collect()
    }

    #[test]
    fn rejects_empty_populations() {
        let cfg = ModelConfig {
            n_as: 0,
            ..ModelConfig::default()
        };
        assert!(Simulation::from_seed(cfg, 1).is_err());

        let cfg = ModelConfig {
            n_bs: 0,
            ..ModelConfig::default()
        };
        assert!(Simulation::from_seed(cfg, 1).is_err());
    }

    #[test]
    fn rejects_negative_learning_rate() {
        let cfg = ModelConfig {
            learning_rate: -0.5,
            ..ModelConfig::default()
        };
        assert!(Simulation::from_seed(cfg, 1).is_err());
    }

    #[test]
    fn starts_at_center() {
        let sim = Simulation::from_seed(ModelConfig::default(), 2).unwrap();
        assert_eq!(sim.pop_a().len(), 10);
        assert_eq!(sim.pop_b().len(), 10);
        assert_eq!(sim.n_ticks(), 0);
        assert!(all_positions(&sim).iter().all(|&pos| pos == INIT_POSITION));
    }

    #[test]
    fn frame_carries_pairs_and_pre_commit_positions() {
        let mut sim = Simulation::from_seed(ModelConfig::default(), 3).unwrap();
        for tick in 0..20 {
            let current: Vec<f64> = sim
                .pop_a()
                .entities()
                .iter()
                .map(|ent| ent.current_position())
                .collect();

            let frame = sim.tick();

            assert_eq!(frame.tick, tick);
            assert_eq!(frame.pairs.len(), 8);
            assert_eq!(frame.a.len(), 10);
            assert_eq!(frame.b.len(), 10);
            for (view, &pos) in frame.a.iter().zip(&current) {
                assert_eq!(view.current_position, pos);
            }
            for (view, ent) in frame.a.iter().zip(sim.pop_a().entities()) {
                assert_eq!(view.id, ent.id());
                assert_eq!(view.next_position, ent.current_position());
            }
            for (view, ent) in frame.b.iter().zip(sim.pop_b().entities()) {
                assert_eq!(view.next_position, ent.current_position());
            }
        }
        assert_eq!(sim.n_ticks(), 20);
    }

    #[test]
    fn positions_stay_in_unit_interval() {
        let cfg = ModelConfig {
            learning_rate: 0.9,
            ..ModelConfig::default()
        };
        let mut sim = Simulation::from_seed(cfg, 4).unwrap();
        for _ in 0..500 {
            sim.tick();
            assert!(all_positions(&sim).iter().all(|pos| (0.0..=1.0).contains(pos)));
        }
    }

    #[test]
    fn latent_values_never_change() {
        let mut sim = Simulation::from_seed(ModelConfig::default(), 5).unwrap();
        let latent = |sim: &Simulation| -> Vec<f64> {
            sim.pop_a()
                .entities()
                .iter()
                .chain(sim.pop_b().entities())
                .map(|ent| ent.latent_value())
                .collect()
        };
        let before = latent(&sim);
        assert!(before.iter().all(|val| (0.0..=1.0).contains(val)));
        for _ in 0..100 {
            sim.tick();
        }
        assert_eq!(before, latent(&sim));
    }

    #[test]
    fn same_seed_same_trajectory() {
        let mut sim_1 = Simulation::from_seed(ModelConfig::default(), 6).unwrap();
        let mut sim_2 = Simulation::from_seed(ModelConfig::default(), 6).unwrap();
        for _ in 0..50 {
            assert_eq!(sim_1.tick(), sim_2.tick());
        }
    }

    #[test]
    fn zero_pairs_commit_without_moving() {
        let cfg = ModelConfig {
            n_pairs: 0,
            ..ModelConfig::default()
        };
        let mut sim = Simulation::from_seed(cfg, 7).unwrap();
        let frame = sim.tick();
        assert!(frame.pairs.is_empty());
        assert_eq!(sim.n_ticks(), 1);
        assert!(all_positions(&sim).iter().all(|&pos| pos == INIT_POSITION));
    }

    #[test]
    fn later_pair_overwrites_earlier_write() {
        // A[0] is smaller than B[0] (sits below it) and bigger than B[1]
        // (sits above it): the first pair raises A[0], the second lowers it.
        let pop_a = Population::from_entities(vec![
            Entity::with_position(0, 0.5, 0.4),
            Entity::with_position(1, 0.5, 0.5),
        ]);
        let pop_b = Population::from_entities(vec![
            Entity::with_position(0, 0.9, 0.6),
            Entity::with_position(1, 0.1, 0.2),
        ]);
        let mut sim = with_populations(small_cfg(), pop_a, pop_b);
        let pairs = [Pair { a_id: 0, b_id: 0 }, Pair { a_id: 0, b_id: 1 }];

        let mut rng = sim.rng.clone();
        let lr = sim.cfg.learning_rate;
        let (_step_a_1, _step_b_1) = (lr * rng.random::<f64>(), lr * rng.random::<f64>());
        let (step_a_2, step_b_2) = (lr * rng.random::<f64>(), lr * rng.random::<f64>());

        assert_eq!(sim.apply_pairs(&pairs), 2);

        let ent_a = &sim.pop_a().entities()[0];
        assert_eq!(ent_a.next_position(), 0.4 - step_a_2);
        assert_eq!(sim.pop_b().entities()[1].next_position(), 0.2 + step_b_2);
        assert!(sim.pop_b().entities()[0].next_position() <= 0.6);
        assert_eq!(ent_a.current_position(), 0.4);
    }

    #[test]
    fn unmatched_pair_leaves_next_positions() {
        let pop_a = Population::from_entities(vec![
            Entity::with_position(0, 0.1, 0.6),
            Entity::with_position(1, 0.5, 0.5),
        ]);
        let pop_b = Population::from_entities(vec![
            Entity::with_position(0, 0.9, 0.5),
            Entity::with_position(1, 0.5, 0.5),
        ]);
        let mut sim = with_populations(small_cfg(), pop_a, pop_b);

        assert_eq!(sim.apply_pairs(&[Pair { a_id: 0, b_id: 0 }]), 0);
        assert_eq!(sim.pop_a().entities()[0].next_position(), 0.6);
        assert_eq!(sim.pop_b().entities()[0].next_position(), 0.5);
    }
}
