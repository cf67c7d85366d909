//! Hardware module for camera optics configurations

pub mod optics;

pub use optics::{CameraOptics, PsfSelection};
