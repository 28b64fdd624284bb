pub mod commands;
pub mod output;

pub use commands::{Command, CommandHandler, CommandResult};
pub use output::{print_error, print_info, print_plain, print_result, print_success};
