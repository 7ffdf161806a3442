use song_catalog::lyrics::{couplet, couplets};

#[test]
fn test_two_couplets() {
    let text = "A.\nB.\n\nC.";
    assert_eq!(couplets(text), vec!["A.\nB.", "C."]);
    assert_eq!(couplet(text, 0), Some("A.\nB."));
    assert_eq!(couplet(text, 1), Some("C."));
    assert_eq!(couplet(text, 2), None);
}

#[test]
fn test_text_without_blank_line_is_one_couplet() {
    let text = "Line one\nLine two\nLine three";
    assert_eq!(couplets(text), vec![text]);
    assert_eq!(couplet(text, 1), None);
}

#[test]
fn test_couplet_keeps_surrounding_whitespace() {
    let text = "  first  \n\n\tsecond\n";
    assert_eq!(couplet(text, 0), Some("  first  "));
    assert_eq!(couplet(text, 1), Some("\tsecond\n"));
}

#[test]
fn test_trailing_separator_adds_empty_couplet() {
    assert_eq!(couplets("Verse\n\n"), vec!["Verse", ""]);
}

#[test]
fn test_crlf_is_not_a_separator() {
    assert_eq!(couplets("A\r\n\r\nB").len(), 1);
}

#[test]
fn test_unicode_lyrics() {
    let text = "Ой, то не вечер\nто не вечер\n\nМне малым-мало спалось";
    assert_eq!(couplet(text, 1), Some("Мне малым-мало спалось"));
}
