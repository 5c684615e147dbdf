pub mod member;
pub mod payment;

pub use member::*;
pub use payment::*;
