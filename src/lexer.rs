//! `@supports` 条件的词法分析器
//!
//! 词法分析器是宽松的：无法识别的字符会被逐个跳过，而不是报错，
//! 语法校验全部交给语法分析器完成。

use log::{debug, trace};

use crate::token::{Feature, FeatureKind, Span, Token, TokenKind};

/// 逻辑关键字（区分大小写，按整词匹配）
const KEYWORDS: [(&str, TokenKind<'static>); 3] = [
    ("not", TokenKind::Not),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
];

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind<'a>, start: usize) -> Token<'a> {
        Token::new(kind, &self.input[start..self.position], Span::new(start, self.position))
    }

    /// 尝试在当前位置匹配一个完整的逻辑关键字
    fn read_keyword(&mut self, start: usize) -> Option<Token<'a>> {
        let rest = &self.input[start..];
        let at_boundary = self.input[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        if !at_boundary {
            return None;
        }

        for (word, kind) in KEYWORDS {
            if !rest.starts_with(word) {
                continue;
            }
            // 关键字之后也必须是词边界，例如 "notable" 不是 "not"
            if rest[word.len()..].chars().next().is_some_and(is_word_char) {
                continue;
            }
            self.position = start + word.len();
            return Some(self.token(kind, start));
        }
        None
    }

    /// 读取一个特性原子：`name: value`、`name(args)` 或无法识别的字面量
    ///
    /// 名称部分是从当前位置开始、不含 `:`、`(`、`)` 的最长字符序列。
    /// 名称为空时返回 `None`。
    fn read_feature(&mut self, start: usize) -> Option<Token<'a>> {
        let rest = &self.input[start..];
        let name_len = rest.find(&[':', '(', ')'][..]).unwrap_or(rest.len());
        if name_len == 0 {
            return None;
        }
        let left = &rest[..name_len];
        let separator = start + name_len;

        let function_form = match self.input[separator..].chars().next() {
            Some(':') => false,
            Some('(') => true,
            _ => {
                // 既不是声明也不是函数，只消费名称本身
                self.position = separator;
                return Some(self.token(TokenKind::Feature(Feature::bare(left)), start));
            }
        };

        let (end, terminated) = scan_feature_body(self.input, separator);
        self.position = end;

        let raw = &self.input[start..end];
        let body = &raw[name_len + 1..];
        let body = if function_form {
            body.strip_suffix(')').unwrap_or(body)
        } else {
            body
        };

        let kind = match (terminated, function_form) {
            (false, _) => FeatureKind::Invalid,
            (true, true) => FeatureKind::Function,
            (true, false) => FeatureKind::Declaration,
        };
        let feature = Feature {
            kind,
            function_form,
            left,
            right: body.trim(),
        };
        Some(self.token(TokenKind::Feature(feature), start))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.skip_whitespace();
            let start = self.position;
            let c = self.peek()?; // 到达输入末尾

            match c {
                '(' => {
                    self.bump();
                    return Some(self.token(TokenKind::LParen, start));
                }
                ')' => {
                    self.bump();
                    return Some(self.token(TokenKind::RParen, start));
                }
                _ => {}
            }

            if let Some(token) = self.read_keyword(start) {
                return Some(token);
            }
            if let Some(token) = self.read_feature(start) {
                return Some(token);
            }

            // 没有任何匹配，跳过一个字符以避免死循环
            self.bump();
        }
    }
}

/// 对整个输入进行分词
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let tokens: Vec<_> = Lexer::new(input)
        .inspect(|token| trace!("token {:?} at {}..{}", token.raw, token.span.start, token.span.end))
        .collect();
    debug!("tokenized {} bytes into {} tokens", input.len(), tokens.len());
    tokens
}

/// 与正则 `\b` 一致的单词字符
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// 从分隔符（`:` 或 `(`）开始向后扫描特性内容
///
/// 嵌套的括号会被配平，引号中的内容会被整体跳过，遇到第一个未配平的 `)`
/// 或输入结束时停止。返回停止位置，以及所有引号是否都正常闭合。
fn scan_feature_body(input: &str, from: usize) -> (usize, bool) {
    let bytes = input.as_bytes();
    let mut end = from;
    let mut depth = 0usize;
    let mut terminated = true;

    while end < bytes.len() {
        match bytes[end] {
            quote @ (b'\'' | b'"' | b'`') => match find_closing_quote(bytes, end + 1, quote) {
                Some(close) => end = close,
                // 引号未闭合：标记为无效，但继续扫描剩余输入
                None => terminated = false,
            },
            b'(' => depth += 1,
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            _ => {}
        }
        end += 1;
    }

    (end, terminated)
}

/// 查找下一个未被转义的引号（前面有偶数个连续反斜杠）
fn find_closing_quote(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
    let mut backslashes = 0usize;
    for (offset, &b) in bytes.get(from..)?.iter().enumerate() {
        if b == quote && backslashes % 2 == 0 {
            return Some(from + offset);
        }
        if b == b'\\' {
            backslashes += 1;
        } else {
            backslashes = 0;
        }
    }
    None
}
