pub mod additional;
pub mod collection;
pub mod upload;

pub use additional::{additional_get, additional_post, additional_upload_post};
pub use collection::{collection_get, collection_list, collection_post, collection_put};
pub use upload::{file_delete, upload_post};
