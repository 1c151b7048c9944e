//! Command handlers for the chatread CLI.

pub mod approaches;
pub mod ask;

pub use approaches::ApproachesCommand;
pub use ask::AskCommand;
