use std::path::Path;

use rand::{SeedableRng, rngs::StdRng};
use smplx::{CameraConfig, ImportError, PoseParameters, PosePatch};
use tracing::info;

use crate::engine::tracked::Tracked;

/// The single owner of the parameters and the camera. Every edit goes through here so the
/// viewport can react to changes once per frame.
pub struct StudioState {
    pub params: Tracked<PoseParameters>,
    pub camera: Tracked<CameraConfig>,
    /// Draw lines between parent and child joints.
    pub show_bones: bool,
    rng: StdRng,
}

impl StudioState {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            params: Tracked::new(PoseParameters::default()),
            camera: Tracked::new(CameraConfig::default()),
            show_bones: false,
            rng,
        }
    }

    /// Edit a copy of the parameters and store it as the new value.
    pub fn update_params(&mut self, edit: impl FnOnce(&mut PoseParameters)) {
        let mut params = (*self.params).clone();
        edit(&mut params);
        params.conform();
        self.params.set(params);
    }

    pub fn update_camera(&mut self, edit: impl FnOnce(&mut CameraConfig)) {
        let mut camera = (*self.camera).clone();
        edit(&mut camera);
        self.camera.set(camera.clamped());
    }

    pub fn randomize(&mut self) {
        let params = smplx::random_parameters(&mut self.rng);
        self.params.set(params);
    }

    pub fn reset_params(&mut self) {
        self.params.set(PoseParameters::default());
    }

    pub fn reset_camera(&mut self) {
        self.camera.set(CameraConfig::default());
    }

    pub fn apply_patch(&mut self, patch: PosePatch) {
        if patch.is_empty() {
            return;
        }
        self.update_params(|params| params.merge(patch));
    }

    /// Merge a parameter file from disk. Nothing changes when the file can't be used.
    pub fn import_file(&mut self, path: &Path) -> Result<(), ImportError> {
        let patch = smplx::import_file(path)?;
        info!("Imported parameters from {}", path.display());
        self.apply_patch(patch);
        Ok(())
    }

    /// Merge a parameter file that was dropped without a path on disk.
    pub fn import_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), ImportError> {
        let patch = smplx::import_bytes(name, bytes)?;
        info!("Imported parameters from {name}");
        self.apply_patch(patch);
        Ok(())
    }

    pub fn export(&self, path: &Path) -> Result<(), ImportError> {
        smplx::export_json(path, &self.params)?;
        info!("Exported parameters to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn settled() -> StudioState {
        let state = StudioState::new(Some(1));
        state.params.if_changed(|_| {});
        state.camera.if_changed(|_| {});
        state
    }

    #[test]
    fn edits_replace_the_parameters() {
        let mut state = settled();
        state.update_params(|params| params.body_pose[4] = 0.5);
        assert!(state.params.changed());
        assert_eq!(state.params.body_pose[4], 0.5);
    }

    #[test]
    fn no_op_edits_are_not_changes() {
        let mut state = settled();
        state.update_params(|_| {});
        assert!(!state.params.changed());
    }

    #[test]
    fn edits_keep_array_lengths() {
        let mut state = settled();
        state.update_params(|params| params.betas.truncate(2));
        assert_eq!(state.params.betas.len(), 10);
    }

    #[test]
    fn seeded_randomize_is_reproducible() {
        let mut a = StudioState::new(Some(9));
        let mut b = StudioState::new(Some(9));
        a.randomize();
        b.randomize();
        assert_eq!(*a.params, *b.params);
        assert_ne!(*a.params, PoseParameters::default());

        a.reset_params();
        assert_eq!(*a.params, PoseParameters::default());
    }

    #[test]
    fn failed_imports_leave_the_state_alone() {
        let mut state = settled();
        state.update_params(|params| params.betas[0] = 1.0);
        let before = (*state.params).clone();

        assert!(state.import_bytes("pose.json", b"{ nope").is_err());
        assert!(state.import_bytes("pose.pkl", b"\x80\x04").is_err());
        assert_eq!(*state.params, before);
    }

    #[test]
    fn huge_numbers_leave_the_state_alone() {
        let mut state = settled();
        state.update_params(|params| params.betas[0] = 1.0);
        state.params.if_changed(|_| {});
        let before = (*state.params).clone();

        assert!(matches!(
            state.import_bytes("pose.json", br#"{"betas":[1e39]}"#),
            Err(ImportError::NonFinite { .. })
        ));
        assert_eq!(*state.params, before);
        assert!(!state.params.changed());

        // Edits keep working afterwards.
        state.update_params(|params| params.betas[1] = 0.5);
        assert!(state.params.changed());
        let mut skeleton = smplx::Skeleton::build(&smplx::JointTable::smplx_body().unwrap());
        assert!(skeleton.apply_pose(&state.params).is_ok());
    }

    #[test]
    fn imports_merge_partially() {
        let mut state = settled();
        state.update_params(|params| params.betas[0] = 1.0);

        state
            .import_bytes("pose.json", br#"{"transl": [0, 0.5, 0]}"#)
            .unwrap();
        assert_eq!(state.params.transl, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(state.params.betas[0], 1.0);
    }

    #[test]
    fn camera_edits_are_clamped_and_reset() {
        let mut state = settled();
        state.update_camera(|camera| {
            camera.fov = 400.0;
            camera.position = Vec3::new(3.0, 3.0, 3.0);
        });
        assert_eq!(state.camera.fov, CameraConfig::MAX_FOV);

        state.camera.if_changed(|_| {});
        state.reset_camera();
        assert!(state.camera.changed());
        assert_eq!(*state.camera, CameraConfig::default());
    }
}
