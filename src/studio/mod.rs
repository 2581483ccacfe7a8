pub mod ai_pose;
pub mod camera;
pub mod notifications;
pub mod panel;
pub mod pose_requests;
pub mod scene;
pub mod state;
pub mod viewport;
pub mod visuals;
