pub mod list;
pub mod setup;
pub mod sync;
