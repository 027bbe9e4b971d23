pub mod console;
pub mod contact;
pub mod requests;
