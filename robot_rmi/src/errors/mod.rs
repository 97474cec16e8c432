mod arm_error;

pub use arm_error::*;
