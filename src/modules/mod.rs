pub mod action_unit;
pub mod expression;
pub mod face_detection_client;
pub mod face_landmark_client;
pub mod summary;
