//! Document changes and their wire encoding.
//!
//! - [`model`]: the closed set of [`ChangeOp`] variants
//! - [`encoder`]: turns a [`ChangeOp`] into a tagged wire structure
//! - [`geometry`]: selection rectangles, corner polygons, text trees and
//!   path segments for newly created shapes
//!
//! Caller input is never validated here: negative sizes, unknown colors and
//! ids that do not exist remotely are all encoded as given.

pub mod encoder;
pub mod geometry;
pub mod model;

pub use encoder::{synthesize, ChangeEncoder, ROOT_FRAME_ID};
pub use geometry::Bounds;
pub use model::{
    AttrOp, BoxShape, ChangeOp, NewColor, NewObject, NewPage, NewTypography, PathCommand,
    PathPoint, PathShape, ShapeSpec, TextShape,
};
