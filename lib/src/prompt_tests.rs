use std::io::Cursor;

use super::*;

#[test]
fn parses_decimal_counts() {
    assert_eq!(parse_user_count("25\n"), 25);
    assert_eq!(parse_user_count("  +7\n"), 7);
}

#[test]
fn parses_hex_and_octal_counts() {
    assert_eq!(parse_user_count("0x10\n"), 16);
    assert_eq!(parse_user_count("0XfF\n"), 255);
    assert_eq!(parse_user_count("010\n"), 8);
}

#[test]
fn stops_at_first_invalid_digit() {
    assert_eq!(parse_user_count("5abc\n"), 5);
    assert_eq!(parse_user_count("09\n"), 1);
}

#[test]
fn treats_zero_empty_and_garbage_as_one() {
    assert_eq!(parse_user_count("0\n"), 1);
    assert_eq!(parse_user_count("\n"), 1);
    assert_eq!(parse_user_count(""), 1);
    assert_eq!(parse_user_count("lots\n"), 1);
    assert_eq!(parse_user_count("-4\n"), 1);
}

#[test]
fn saturates_huge_counts() {
    assert_eq!(parse_user_count("99999999999999999999\n"), u32::MAX);
}

#[test]
fn prompts_and_reads_count() {
    let mut output = Vec::new();
    let mut prompt = LinePrompt::new(Cursor::new("3\n"), &mut output, "eth0");

    assert_eq!(prompt.prompt(42).unwrap(), 3);

    drop(prompt);
    let text = String::from_utf8(output).unwrap();
    assert_eq!(
        text,
        "**** Next packet #42 out eth0.  How many packets do you wish to send? "
    );
}

#[test]
fn reads_successive_answers() {
    let mut prompt =
        LinePrompt::new(Cursor::new("2\n\n0\n"), Vec::new(), "eth0");

    assert_eq!(prompt.prompt(1).unwrap(), 2);
    assert_eq!(prompt.prompt(3).unwrap(), 1);
    assert_eq!(prompt.prompt(4).unwrap(), 1);
}

#[test]
fn returns_error_at_end_of_input() {
    let mut prompt = LinePrompt::new(Cursor::new(""), Vec::new(), "eth0");
    let res = prompt.prompt(1);
    assert!(matches!(res, Err(ReplayLibError::OperatorInput(_))));
}
