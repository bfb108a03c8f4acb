pub mod admin;
pub mod documents;
pub mod loans;
pub mod offers;
