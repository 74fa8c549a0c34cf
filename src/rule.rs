use crate::model::Entity;
use rand::Rng;

/// Outcome of comparing the latent values of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// A's latent value is strictly greater than B's.
    Bigger,
    /// A's latent value is smaller than or equal to B's.
    Smaller,
}

impl Feedback {
    pub fn compare(ent_a: &Entity, ent_b: &Entity) -> Self {
        if ent_a.latent_value() > ent_b.latent_value() {
            Feedback::Bigger
        } else {
            Feedback::Smaller
        }
    }
}

/// Position update decided for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A sits at or below B but is smaller: A moves up, B moves down.
    RaiseA,
    /// A sits at or above B but is bigger: A moves down, B moves up.
    LowerA,
    /// Positions already agree with the feedback.
    Hold,
}

impl Decision {
    pub fn decide(ent_a: &Entity, ent_b: &Entity) -> Self {
        let pos_a = ent_a.current_position();
        let pos_b = ent_b.current_position();
        match Feedback::compare(ent_a, ent_b) {
            Feedback::Smaller if pos_a <= pos_b => Decision::RaiseA,
            Feedback::Bigger if pos_a >= pos_b => Decision::LowerA,
            _ => Decision::Hold,
        }
    }
}

/// Apply the update rule to one pair and return the decision taken.
///
/// Moves are computed from current positions and overwrite next positions,
/// so a later pair touching the same entity replaces this write.
pub fn apply_feedback<R: Rng>(
    ent_a: &mut Entity,
    ent_b: &mut Entity,
    learning_rate: f64,
    rng: &mut R,
) -> Decision {
    let decision = Decision::decide(ent_a, ent_b);

    let sign_a = match decision {
        Decision::RaiseA => 1.0,
        Decision::LowerA => -1.0,
        Decision::Hold => return decision,
    };

    let step_a = learning_rate * rng.random::<f64>();
    let step_b = learning_rate * rng.random::<f64>();

    ent_a.set_next_position(ent_a.current_position() + sign_a * step_a);
    ent_b.set_next_position(ent_b.current_position() - sign_a * step_b);

    decision
}
