pub mod application;
pub mod common;
pub mod payment;
pub mod review;
pub mod scholarship;
pub mod user;

pub use application::*;
pub use common::*;
pub use payment::*;
pub use review::*;
pub use scholarship::*;
pub use user::*;
