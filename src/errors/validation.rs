use thiserror::Error;

// Client-side checks on the delete-account form. Display is the text shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Password is required")]
    PasswordRequired,

    #[error("Please type DELETE to confirm")]
    ConfirmationMismatch,
}
