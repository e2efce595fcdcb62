pub mod quotes;
pub mod session;
pub mod setup;
pub mod sync;
pub mod transfer;
pub mod ui;
