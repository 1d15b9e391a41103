//! Input: platform events mapped to camera actions.
//!
//! The driver turns winit events into [`Action`]s; [`CameraController`]
//! applies them to the camera. Held keys are tracked in [`KeyState`] and
//! polled once per frame, scaled by the [`FrameClock`] delta.
//!
//! # Invariants
//! - The camera is only mutated through actions.
//! - Frame delta time is never negative and never above [`MAX_FRAME_DT`].

pub mod action;
pub mod clock;
pub mod controller;
pub mod keys;

pub use action::{Action, MoveDirection};
pub use clock::{FrameClock, MAX_FRAME_DT};
pub use controller::CameraController;
pub use keys::KeyState;
