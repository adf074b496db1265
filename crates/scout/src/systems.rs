mod system;
pub mod search;

pub use system::System;
