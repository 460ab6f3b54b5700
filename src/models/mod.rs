mod user;
mod forms;
mod activity;

pub use user::User;
pub use forms::{DeleteAccountForm, HeaderDeleteForm, LogoutForm, LogoutTarget, PageQuery};
pub use activity::ActivityLogEntry;
