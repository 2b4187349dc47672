use std::borrow::Cow;

#[farm_derive::farm_error]
pub enum SampleError {
    #[error("Parse failure{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Internal sample error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<i32, SampleError> {
    raw.parse::<i32>().context(format!("parsing {raw:?}"))
}

#[test]
fn context_is_rendered_in_display() {
    let err = parse("twelve").expect_err("not a number");
    assert!(matches!(err, SampleError::Parse { .. }));
    assert!(err.to_string().starts_with("Parse failure (parsing \"twelve\"): "));
}

#[test]
fn question_mark_converts_source_without_context() {
    fn run() -> Result<i32, SampleError> {
        Ok("x".parse::<i32>()?)
    }
    let err = run().expect_err("not a number");
    assert!(err.to_string().starts_with("Parse failure: "));
}

#[test]
fn context_can_be_attached_to_own_errors() {
    let err: Result<(), SampleError> = Err("plain".into());
    let err = err.context("outer").expect_err("still an error");
    assert_eq!(err.to_string(), "Internal sample error (outer): plain");
}

#[test]
fn farm_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/farm_error_pass.rs");
}
