mod domain;
mod policy;
mod record;

pub use domain::*;
pub use policy::*;
pub use record::*;
