use std::borrow::Cow;

/// A specialized [`AuthError`] enum of this crate.
#[farm_derive::farm_error]
pub enum AuthError {
    #[error("Sign-in rejected{}: {message}", format_context(.context))]
    InvalidCredentials { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Session error{}: {source}", format_context(.context))]
    Session { source: farm_kernel::context::ContextError, context: Option<Cow<'static, str>> },
}
