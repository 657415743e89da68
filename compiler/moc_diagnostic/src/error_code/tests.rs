use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E6003.to_string(), "E6003");
    assert_eq!(ErrorCode::E9001.as_str(), "E9001");
}

#[test]
fn test_predicate_exclusivity() {
    for code in [ErrorCode::E6001, ErrorCode::E6007, ErrorCode::E6013] {
        assert!(code.is_eval_error());
        assert!(!code.is_internal_error());
    }
    assert!(ErrorCode::E9001.is_internal_error());
    assert!(!ErrorCode::E9001.is_eval_error());
}
