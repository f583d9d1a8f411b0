// builders/ - Procedural object builders
//
// Pure functions: parameters and an Rng in, a finished SceneObject subtree
// out. Nothing here touches shared state. Composite objects attach their
// children at offsets relative to their own origin.

mod city;
mod globe;
mod port;

pub use city::{building, moon, BUILDING_COLORS, WINDOW_SIZE, WINDOW_SPACING};
pub use globe::{atmosphere, globe, star_dome, TEX_CLOUDS, TEX_EARTH, TEX_LIGHTS, TEX_STARS};
pub use port::{beacon, craft, random_orbit, ring, tower, CRAFT_COLORS};
