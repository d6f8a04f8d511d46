//! Slot pools and linked 2D portal frames for small interactive toys.
//!
//! - [`util::pool`]: fixed-capacity pool that recycles items by swapping
//!   them to the free boundary.
//! - [`portal`]: oriented portal segments with local frames, linked in a
//!   [`portal::PortalSet`] so a point can be mapped through to the sibling.
//! - [`teleport`]: per-frame crossing check with cooldown on top of both.

pub mod app;
pub mod debug;
pub mod geom;
pub mod notify;
pub mod particles;
pub mod portal;
pub mod teleport;
pub mod util;
