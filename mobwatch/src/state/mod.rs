pub mod activity;
pub mod history;
pub mod targeting;

pub use activity::ActivityTracker;
pub use history::MessageStore;
pub use targeting::TargetingLedger;
