//! Command handlers, one module per command group.

mod init;
mod misc;
mod notes;
mod reset;

pub use init::handle_init;
pub use misc::handle_completions;
pub use notes::{handle_add, handle_delete, handle_edit, handle_list, handle_show};
pub use reset::handle_reset;
