//! Hub API model types.

mod bom;
mod code_location;
mod component;
mod license;
mod policy;
mod project;
mod rapid_scan;
mod snippet;
mod status;
mod user;
mod vulnerability;

pub use bom::*;
pub use code_location::*;
pub use component::*;
pub use license::*;
pub use policy::*;
pub use project::*;
pub use rapid_scan::*;
pub use snippet::*;
pub use status::*;
pub use user::*;
pub use vulnerability::*;
