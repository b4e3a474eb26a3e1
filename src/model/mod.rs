mod common;
mod engagement;
mod list;
mod match_detail;
mod review;
mod team;
mod user;

pub use common::*;
pub use engagement::*;
pub use list::*;
pub use match_detail::*;
pub use review::*;
pub use team::*;
pub use user::*;
