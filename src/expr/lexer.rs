//! Tokenizer for the expression language.

use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::StarStar);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '&' => {
                chars.next();
                tokens.push(Token::And);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Or);
            }
            '~' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Eq);
                } else {
                    return Err(ExprError::Parse("'=' is not an operator; use '=='".into()));
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    return Err(ExprError::Parse("'!' is not an operator; use 'not'".into()));
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '"' | '\'' => {
                let quote = ch;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => s.push(c),
                        None => {
                            return Err(ExprError::Parse("unterminated string literal".into()));
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            '`' => {
                // Backtick-quoted column name, for names with spaces.
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(ExprError::Parse("unterminated backtick name".into()));
                        }
                    }
                }
                tokens.push(Token::Ident(name));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' {
                        text.push(c);
                        chars.next();
                    } else if (c == '+' || c == '-')
                        && matches!(text.chars().last(), Some('e' | 'E'))
                    {
                        // Exponent sign
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::Parse(format!("bad number literal '{text}'")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Ident(word),
                });
            }
            other => {
                return Err(ExprError::Parse(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_arithmetic() {
        let tokens = tokenize("A * 2 + B").expect("valid expression");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("A".to_owned()),
                Token::Star,
                Token::Number(2.0),
                Token::Plus,
                Token::Ident("B".to_owned()),
            ]
        );
    }

    #[test]
    fn test_tokenize_comparison_and_keywords() {
        let tokens = tokenize("A >= 1.5 and not B == 'x'").expect("valid expression");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("A".to_owned()),
                Token::Ge,
                Token::Number(1.5),
                Token::And,
                Token::Not,
                Token::Ident("B".to_owned()),
                Token::Eq,
                Token::Str("x".to_owned()),
            ]
        );
    }

    #[test]
    fn test_tokenize_backtick_name() {
        let tokens = tokenize("`Metric A` > 10").expect("valid expression");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("Metric A".to_owned()),
                Token::Gt,
                Token::Number(10.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_rejects_lone_equals() {
        assert!(tokenize("A = 1").is_err());
    }

    #[test]
    fn test_tokenize_exponent_literal() {
        let tokens = tokenize("1.5e-3").expect("valid expression");
        assert_eq!(tokens, vec![Token::Number(1.5e-3)]);
    }
}
