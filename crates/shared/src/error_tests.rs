use super::*;
use rstest::rstest;

#[rstest]
#[case(AppError::Forbidden("test".into()), 403, "FORBIDDEN")]
#[case(AppError::BadRequest("test".into()), 400, "BAD_REQUEST")]
#[case(AppError::NotFound("test".into()), 404, "NOT_FOUND")]
#[case(AppError::Decode("test".into()), 422, "DECODE_ERROR")]
#[case(AppError::Storage("test".into()), 500, "STORAGE_ERROR")]
#[case(AppError::Internal("test".into()), 500, "INTERNAL_ERROR")]
fn test_app_error_status_and_code(
    #[case] err: AppError,
    #[case] status: u16,
    #[case] code: &str,
) {
    assert_eq!(err.status_code(), status);
    assert_eq!(err.error_code(), code);
}

#[test]
fn test_app_error_display() {
    assert_eq!(
        format!("{}", AppError::Forbidden("msg".into())),
        "Access denied: msg"
    );
    assert_eq!(
        format!("{}", AppError::BadRequest("msg".into())),
        "Bad request: msg"
    );
    assert_eq!(
        format!("{}", AppError::NotFound("msg".into())),
        "Not found: msg"
    );
    assert_eq!(
        format!("{}", AppError::Decode("msg".into())),
        "Decode error: msg"
    );
    assert_eq!(
        format!("{}", AppError::Storage("msg".into())),
        "Storage error: msg"
    );
    assert_eq!(
        format!("{}", AppError::Internal("msg".into())),
        "Internal error: msg"
    );
}

#[test]
fn test_public_message_hides_storage_details() {
    let err = AppError::Storage("/srv/uploads: permission denied".into());
    assert_eq!(err.public_message(), "Storage operation failed");

    let err = AppError::Internal("task panicked".into());
    assert_eq!(err.public_message(), "An error occurred");

    let err = AppError::NotFound("image abc".into());
    assert_eq!(err.public_message(), "Not found: image abc");
}
