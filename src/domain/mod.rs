//! Domain types the editor works on
//!
//! Nothing here draws pixels or talks to the outside world, and nothing here
//! depends on the renderer.

pub mod capture;
pub mod geometry;
pub mod layer;
pub mod metrics;
pub mod tool;
pub mod viewport;

pub use capture::*;
pub use geometry::*;
pub use layer::*;
pub use tool::*;
pub use viewport::*;
