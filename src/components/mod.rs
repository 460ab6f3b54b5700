pub mod activity;
pub mod html;
pub mod account_page;
pub mod logout_dialog;
pub mod header;

pub use account_page::{AccountPage, DeleteOutcome};
pub use header::Header;
