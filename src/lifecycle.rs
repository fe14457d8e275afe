pub mod orchestrator;
pub mod poll;
pub mod progress;
pub mod site;
pub mod state;
