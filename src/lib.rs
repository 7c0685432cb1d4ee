pub mod animation;
pub mod cli;
pub mod controller;
pub mod directions;
pub mod geometry;
pub mod host;
pub mod options;
pub mod render;
pub mod replay;
pub mod transition;

pub use crate::controller::{ModalController, ModalHandle};
pub use crate::host::{HeadlessHost, OverlayHost};
pub use crate::transition::{Mode, TransitionState};
