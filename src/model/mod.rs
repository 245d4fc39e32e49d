mod account;
mod submission;

pub use account::*;
pub use submission::*;
