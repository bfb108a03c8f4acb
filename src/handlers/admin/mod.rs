pub mod status;
pub mod verify;

pub use status::{additional_status_patch, file_status_patch};
pub use verify::additional_verify_put;
