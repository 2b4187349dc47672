use std::borrow::Cow;

/// A specialized [`MortalityError`] enum of this crate.
#[farm_derive::farm_error]
pub enum MortalityError {
    #[error("Invalid mortality record{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
