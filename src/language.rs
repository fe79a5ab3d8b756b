/// Cheap script-range heuristic: true if the text contains any hiragana,
/// katakana, or CJK unified ideograph. Entries classified Japanese skip the
/// summarizer and ship their own summary verbatim.
pub fn is_japanese(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '\u{3040}'..='\u{30ff}' | '\u{4e00}'..='\u{9fff}'))
}
