use serde::{Deserialize, Serialize};

use super::lexicon::{is_cjk, is_segment_break, is_segment_word, MAX_SEGMENT_CHARS};

/// Script class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Latin,
    Cjk,
}

/// A token with its char offset in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// Offset of the first character, counted in chars.
    pub position: usize,
}

impl Token {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split text into Latin words and CJK segments.
///
/// Latin words are alphanumeric runs that may contain inner apostrophes or
/// hyphens. CJK runs are segmented by forward maximum matching against the
/// built-in lexicon; uncovered characters are grouped together and a small set
/// of particles always ends a segment.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_alphanumeric() {
            let start = i;
            let mut end = i + 1;
            while end < chars.len() {
                let next = chars[end];
                if next.is_ascii_alphanumeric() {
                    end += 1;
                } else if (next == '\'' || next == '-')
                    && chars.get(end + 1).is_some_and(|c| c.is_ascii_alphanumeric())
                {
                    end += 2;
                } else {
                    break;
                }
            }
            tokens.push(Token {
                text: chars[start..end].iter().collect(),
                kind: TokenKind::Latin,
                position: start,
            });
            i = end;
        } else if is_cjk(c) {
            let start = i;
            let mut end = i;
            while end < chars.len() && is_cjk(chars[end]) {
                end += 1;
            }
            segment_cjk(&chars[start..end], start, &mut tokens);
            i = end;
        } else {
            i += 1;
        }
    }

    tokens
}

fn segment_cjk(run: &[char], offset: usize, tokens: &mut Vec<Token>) {
    let mut pending = String::new();
    let mut pending_start = offset;
    let mut i = 0;

    let flush = |pending: &mut String, start: usize, tokens: &mut Vec<Token>| {
        if !pending.is_empty() {
            tokens.push(Token {
                text: std::mem::take(pending),
                kind: TokenKind::Cjk,
                position: start,
            });
        }
    };

    while i < run.len() {
        let longest = (2..=MAX_SEGMENT_CHARS.min(run.len() - i))
            .rev()
            .map(|len| (len, run[i..i + len].iter().collect::<String>()))
            .find(|(_, word)| is_segment_word(word));

        if let Some((len, word)) = longest {
            flush(&mut pending, pending_start, tokens);
            tokens.push(Token {
                text: word,
                kind: TokenKind::Cjk,
                position: offset + i,
            });
            i += len;
            pending_start = offset + i;
        } else if is_segment_break(run[i]) {
            flush(&mut pending, pending_start, tokens);
            tokens.push(Token {
                text: run[i].to_string(),
                kind: TokenKind::Cjk,
                position: offset + i,
            });
            i += 1;
            pending_start = offset + i;
        } else {
            if pending.is_empty() {
                pending_start = offset + i;
            }
            pending.push(run[i]);
            i += 1;
        }
    }
    flush(&mut pending, pending_start, tokens);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_latin_words() {
        assert_eq!(
            texts("What's the meaning of well-known?"),
            vec!["What's", "the", "meaning", "of", "well-known"]
        );
        assert_eq!(texts("'ephemeral'"), vec!["ephemeral"]);
    }

    #[test]
    fn test_mixed_script_segmentation() {
        assert_eq!(
            texts("sensible的同义词有哪些"),
            vec!["sensible", "的", "同义词", "有哪些"]
        );
        assert_eq!(texts("什么是 sensible"), vec!["什么是", "sensible"]);
    }

    #[test]
    fn test_unknown_cjk_runs_are_grouped() {
        assert_eq!(texts("快乐的同义词是什么"), vec!["快乐", "的", "同义词", "是什么"]);
        assert_eq!(texts("快乐和高兴的区别"), vec!["快乐", "和", "高兴", "的", "区别"]);
    }

    #[test]
    fn test_demonstratives_split_from_terms() {
        assert_eq!(texts("高兴这个词怎么用"), vec!["高兴", "这个词", "怎么用"]);
        assert_eq!(
            texts("有没有关于勇敢的短语"),
            vec!["有没有", "关于", "勇敢", "的", "短语"]
        );
    }

    #[test]
    fn test_positions_are_char_offsets() {
        let tokens = tokenize("快乐 happy");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 3);
        assert_eq!(tokens[1].kind, TokenKind::Latin);
    }

    #[test]
    fn test_empty_and_punctuation() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ?？!").is_empty());
    }
}
