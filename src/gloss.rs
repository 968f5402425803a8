//! Gloss extraction: pulls standalone Chinese fragments out of a raw
//! translation field. Annotation spans are stripped with an explicit
//! bracket-depth scan and the remainder is split on a fixed separator set;
//! no regex engine involved, the contract is the code below.

/// Extract gloss fragments from a translation string, in order of
/// appearance. Duplicates within one translation are kept; the reverse
/// index builder deduplicates per (gloss, word) pair.
pub fn extract_glosses(translation: &str) -> Vec<String> {
    let stripped = strip_annotations(translation);
    split_fragments(&stripped)
        .into_iter()
        .filter_map(|fragment| {
            let fragment = fragment.trim();
            if !fragment.is_empty() && is_gloss_token(fragment) {
                Some(fragment.to_string())
            } else {
                None
            }
        })
        .collect()
}

/// Remove `[...]` and `(...)` annotation spans. Nesting is tracked with a
/// bracket stack, but only a matched pair is removable: text under an
/// opener that never closes is restored at end of input, and an unmatched
/// closer is kept as a literal (it fails the gloss filter downstream
/// anyway).
fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Raw text of the spans currently open, so it can be flushed back if
    // the opener turns out to be unmatched. Each stack entry records the
    // expected closer and where its span starts in `pending`.
    let mut pending = String::new();
    let mut stack: Vec<(char, usize)> = Vec::new();

    for c in text.chars() {
        match c {
            '[' | '(' => {
                let closer = if c == '[' { ']' } else { ')' };
                stack.push((closer, pending.len()));
                pending.push(c);
            }
            ']' | ')' => {
                if let Some(&(closer, start)) = stack.last() {
                    if closer == c {
                        // Matched pair: drop this span's raw text.
                        stack.pop();
                        pending.truncate(start);
                    } else {
                        pending.push(c);
                    }
                } else {
                    out.push(c);
                }
            }
            _ => {
                if stack.is_empty() {
                    out.push(c);
                } else {
                    pending.push(c);
                }
            }
        }
    }
    // Whatever is still open was never an annotation.
    out.push_str(&pending);
    out
}

/// Split on the separator set: comma variants, semicolon variants, `、`,
/// any whitespace, and the literal two-character escapes `\n` / `\r`
/// (the corpus stores newlines escaped, and each escaped line is its own
/// gloss candidate).
fn split_fragments(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some(&'n') | Some(&'r')) {
            chars.next();
            fragments.push(std::mem::take(&mut current));
        } else if is_separator(c) {
            fragments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fragments.push(current);
    fragments
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '，' | '、' | ';' | '；') || c.is_whitespace()
}

/// A valid gloss token is entirely Han characters, allowing the middle dot
/// (names like 马克·吐温) and the em dash.
fn is_gloss_token(text: &str) -> bool {
    text.chars().all(|c| is_han(c) || c == '·' || c == '—')
}

/// True for characters in the Han script blocks used by the corpus.
pub fn is_han(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'      // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}'    // Extension A
        | '\u{F900}'..='\u{FAFF}'    // Compatibility Ideographs
        | '\u{20000}'..='\u{2A6DF}'  // Extension B
        | '\u{2A700}'..='\u{2EBEF}'  // Extensions C-F
        | '\u{3007}'                 // 〇
    )
}

/// True if any character of `text` is Han. Drives search dispatch:
/// queries containing Han go to the gloss index.
pub fn contains_han(text: &str) -> bool {
    text.chars().any(is_han)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_translation_splits_on_commas() {
        assert_eq!(extract_glosses("喜欢, 喜爱，爱好"), vec!["喜欢", "喜爱", "爱好"]);
    }

    #[test]
    fn splits_on_semicolons_enumeration_comma_and_whitespace() {
        assert_eq!(
            extract_glosses("相似的;类似的；同样的、相像 相仿"),
            vec!["相似的", "类似的", "同样的", "相像", "相仿"]
        );
    }

    #[test]
    fn literal_escape_pairs_are_separators() {
        // The corpus stores embedded newlines as the two characters `\` `n`.
        assert_eq!(extract_glosses(r"喜欢\n像"), vec!["喜欢", "像"]);
        assert_eq!(extract_glosses(r"前进\r后退"), vec!["前进", "后退"]);
    }

    #[test]
    fn bracket_annotations_are_stripped() {
        assert_eq!(extract_glosses("(口语)朋友, 伙伴[俚]"), vec!["朋友", "伙伴"]);
        // A span in the middle joins its neighbours, as the original data expects.
        assert_eq!(extract_glosses("喜欢(like, 中意)爱好"), vec!["喜欢爱好"]);
    }

    #[test]
    fn nested_and_unmatched_brackets() {
        assert_eq!(extract_glosses("甲[乙[丙]丁]戊"), vec!["甲戊"]);
        // Unmatched closer stays in the fragment and disqualifies it.
        assert_eq!(extract_glosses("残]缺, 完好"), vec!["完好"]);
    }

    #[test]
    fn unmatched_opener_keeps_following_text() {
        // The opener never closes: its fragment is disqualified, but
        // glosses after the next separator survive.
        assert_eq!(extract_glosses("词[x 喜欢"), vec!["喜欢"]);
        assert_eq!(extract_glosses("好(未完 喜爱, 爱好"), vec!["喜爱", "爱好"]);
        // A matched pair inside an unclosed span is still stripped.
        assert_eq!(extract_glosses("词[x 喜欢(的)人"), vec!["喜欢人"]);
        // No separator after the unclosed span: the whole fragment fails
        // the gloss filter, as with the original's pair-only stripping.
        assert!(extract_glosses("甲(乙[丙]丁").is_empty());
    }

    #[test]
    fn non_han_fragments_are_dropped() {
        assert_eq!(extract_glosses("vt. 喜欢, to like, 喜爱2"), vec!["喜欢"]);
        assert!(extract_glosses("abc, def").is_empty());
        assert!(extract_glosses("").is_empty());
    }

    #[test]
    fn middle_dot_and_em_dash_are_part_of_a_token() {
        assert_eq!(extract_glosses("马克·吐温"), vec!["马克·吐温"]);
        assert_eq!(extract_glosses("破折号—用法"), vec!["破折号—用法"]);
    }

    #[test]
    fn duplicates_within_one_translation_survive() {
        assert_eq!(extract_glosses("像, 像"), vec!["像", "像"]);
    }

    #[test]
    fn han_dispatch() {
        assert!(contains_han("喜欢"));
        assert!(contains_han("like喜"));
        assert!(!contains_han("like"));
        assert!(!contains_han(""));
    }
}
