pub mod ask_cmd;
pub mod chat_cmd;
pub mod config_cmd;
pub mod default;
pub mod history_cmd;
pub mod run_cmd;
pub mod validate_cmd;
