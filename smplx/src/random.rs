use glam::Vec3;
use rand::Rng;

use crate::params::{
    BETAS_LEN, BODY_POSE_LEN, EXPRESSION_LEN, EYE_POSE_LEN, HAND_POSE_LEN, PoseParameters,
};

pub const BETA_RANGE: f32 = 2.0;
pub const BODY_POSE_RANGE: f32 = 0.3;
pub const HAND_POSE_RANGE: f32 = 0.4;
pub const EXPRESSION_RANGE: f32 = 1.0;
pub const MAX_JAW_OPEN: f32 = 0.2;

/// Generate a plausible random parameter set. Rotations are kept small so limbs don't pass through
/// each other, the jaw only opens, the eyes look straight ahead and the body stays at the origin.
pub fn random_parameters<R: Rng + ?Sized>(rng: &mut R) -> PoseParameters {
    fn symmetric<R: Rng + ?Sized>(rng: &mut R, len: usize, range: f32) -> Vec<f32> {
        (0..len).map(|_| rng.gen_range(-range..=range)).collect()
    }

    PoseParameters {
        betas: symmetric(rng, BETAS_LEN, BETA_RANGE),
        body_pose: symmetric(rng, BODY_POSE_LEN, BODY_POSE_RANGE),
        jaw_pose: vec![rng.gen_range(0.0..=MAX_JAW_OPEN), 0.0, 0.0],
        leye_pose: vec![0.0; EYE_POSE_LEN],
        reye_pose: vec![0.0; EYE_POSE_LEN],
        left_hand_pose: symmetric(rng, HAND_POSE_LEN, HAND_POSE_RANGE),
        right_hand_pose: symmetric(rng, HAND_POSE_LEN, HAND_POSE_RANGE),
        expression: symmetric(rng, EXPRESSION_LEN, EXPRESSION_RANGE),
        transl: Vec3::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn within(values: &[f32], min: f32, max: f32) -> bool {
        values.iter().all(|v| (min..=max).contains(v))
    }

    #[test]
    fn samples_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let params = random_parameters(&mut rng);

            assert!(within(&params.betas, -2.0, 2.0));
            assert!(within(&params.body_pose, -0.3, 0.3));
            assert!(within(&params.left_hand_pose, -0.4, 0.4));
            assert!(within(&params.right_hand_pose, -0.4, 0.4));
            assert!(within(&params.expression, -1.0, 1.0));
            assert!(within(&params.jaw_pose[..1], 0.0, 0.2));
            assert_eq!(&params.jaw_pose[1..], &[0.0, 0.0]);
            assert_eq!(params.leye_pose, vec![0.0; 3]);
            assert_eq!(params.reye_pose, vec![0.0; 3]);
            assert_eq!(params.transl, Vec3::ZERO);
        }
    }

    #[test]
    fn lengths_match_defaults() {
        let params = random_parameters(&mut StdRng::seed_from_u64(1));
        let mut conformed = params.clone();
        conformed.conform();
        assert_eq!(params, conformed);
    }

    #[test]
    fn seeded_generators_reproduce() {
        let a = random_parameters(&mut StdRng::seed_from_u64(42));
        let b = random_parameters(&mut StdRng::seed_from_u64(42));
        let c = random_parameters(&mut StdRng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
