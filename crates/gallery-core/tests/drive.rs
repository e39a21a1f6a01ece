use gallery_core::drive::escape_query_value;

#[test]
fn plain_names_pass_through() {
    assert_eq!(escape_query_value("GALLERY-Trip"), "GALLERY-Trip");
}

#[test]
fn single_quotes_are_escaped() {
    assert_eq!(escape_query_value("O'Brien's"), "O\\'Brien\\'s");
}

#[test]
fn backslashes_escape_before_quotes() {
    assert_eq!(escape_query_value(r"a\'b"), r"a\\\'b");
}
