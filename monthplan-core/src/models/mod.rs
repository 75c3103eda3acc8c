mod coerce;
mod identity;
mod plan;
mod user;

pub use coerce::*;
pub use identity::*;
pub use plan::*;
pub use user::*;
