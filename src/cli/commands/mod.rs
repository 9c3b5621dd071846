//! One module per subcommand.  Each exposes an `execute` function.

pub mod audit_cmd;
pub mod completions;
pub mod delete;
pub mod get;
pub mod init;
pub mod list;
pub mod rotate;
pub mod salt;
pub mod set;
pub mod show_salt;
pub mod verify;
