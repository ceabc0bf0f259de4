pub mod hierarchy;
pub mod merge;
pub mod resolve;
pub mod sync;
