use crate::error::{MaterialError, MaterialResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `**`
    Power,
    LParen,
    RParen,
    Comma,
    /// `=`
    Assign,
}

/// 수식 문자열을 토큰으로 나눈다.
///
/// 산술 문법에 없는 문자(`;`, `.` 접근, 따옴표, 대괄호 등)는 즉시 거부한다.
pub fn tokenize(input: &str) -> MaterialResult<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = bytes[pos];
        match ch {
            b' ' | b'\t' => pos += 1,
            b'+' => {
                tokens.push(Token::Plus);
                pos += 1;
            }
            b'-' => {
                tokens.push(Token::Minus);
                pos += 1;
            }
            b'*' if bytes.get(pos + 1) == Some(&b'*') => {
                tokens.push(Token::Power);
                pos += 2;
            }
            b'*' => {
                tokens.push(Token::Star);
                pos += 1;
            }
            b'/' => {
                tokens.push(Token::Slash);
                pos += 1;
            }
            b'(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            b',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            b'=' if bytes.get(pos + 1) == Some(&b'=') => {
                return Err(unexpected(input, pos));
            }
            b'=' => {
                tokens.push(Token::Assign);
                pos += 1;
            }
            b'0'..=b'9' | b'.' => {
                let (value, next) = number(input, pos)?;
                tokens.push(Token::Number(value));
                pos = next;
            }
            c if is_id_start(c) => {
                let start = pos;
                while pos < bytes.len() && is_id_continue(bytes[pos]) {
                    pos += 1;
                }
                tokens.push(Token::Ident(input[start..pos].to_string()));
            }
            _ => return Err(unexpected(input, pos)),
        }
    }
    Ok(tokens)
}

fn is_id_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_id_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

fn unexpected(input: &str, pos: usize) -> MaterialError {
    let shown = input[pos..].chars().next().unwrap_or('?');
    MaterialError::UnsafeExpression(format!("허용되지 않은 문자 '{shown}' (위치 {pos})"))
}

/// `12`, `1.5`, `.5`, `2e-3` 형태의 숫자. 뒤에 식별자 문자가 바로 붙으면 거부한다.
fn number(input: &str, start: usize) -> MaterialResult<(f64, usize)> {
    let bytes = input.as_bytes();
    let mut pos = start;
    let mut seen_digit = false;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
        seen_digit = true;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return Err(unexpected(input, start));
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > digits_start {
            pos = exp;
        }
    }
    if pos < bytes.len() && (is_id_continue(bytes[pos]) || bytes[pos] == b'.') {
        return Err(unexpected(input, pos));
    }
    let value = input[start..pos].parse::<f64>().map_err(|_| {
        MaterialError::UnsafeExpression(format!("숫자 형식 오류: {}", &input[start..pos]))
    })?;
    Ok((value, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_assignment_with_power() {
        let tokens = tokenize("value = temperature**2 * 1.5e-1").expect("tokens");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("value".into()),
                Token::Assign,
                Token::Ident("temperature".into()),
                Token::Power,
                Token::Number(2.0),
                Token::Star,
                Token::Number(0.15),
            ]
        );
    }

    #[test]
    fn rejects_statement_separator_and_attribute_access() {
        for src in [
            "value = 1; import os",
            "value = os.system",
            "value = 'a'",
            "value = x[0]",
            "value = 1 == 1",
            "value = 1.2.3",
            "value = 3j",
        ] {
            assert!(
                matches!(tokenize(src), Err(MaterialError::UnsafeExpression(_))),
                "{src}"
            );
        }
    }

    #[test]
    fn leading_dot_number() {
        assert_eq!(tokenize(".5").expect("tokens"), vec![Token::Number(0.5)]);
    }
}
