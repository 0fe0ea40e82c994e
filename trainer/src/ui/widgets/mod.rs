//! TUI widgets for the trainer companion

pub mod creature_panel;
pub mod input;
pub mod log;
pub mod team_list;
pub mod trainer_panel;

pub use creature_panel::CreaturePanelWidget;
pub use input::InputWidget;
pub use log::LogWidget;
pub use team_list::TeamListWidget;
pub use trainer_panel::TrainerPanelWidget;
