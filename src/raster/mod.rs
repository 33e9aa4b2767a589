/// Owned RGBA8 scratch surfaces.
pub mod surface;
