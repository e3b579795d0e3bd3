mod check;
mod status;
mod update;

pub use check::run_check;
pub use status::run_status;
pub use update::run_update;
