//! `@supports` 条件的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   └─ parse_group(End)
//!        ├─ parse_primary()
//!        │    ├─ "("   → parse_group(RParen) (递归)
//!        │    ├─ "not" → Not(parse_primary())
//!        │    └─ 特性原子 → Declaration / Function / InvalidAtom
//!        │
//!        ├─ 遇到 and / or 时，继续解析下一个 primary
//!        │    └─ 同一层级混用 and 和 or → InvalidGroup
//!        │
//!        └─ 校验结束符：括号组必须以 ")" 结束，最外层必须到达输入末尾
//! ```
//!
//! ## 语法
//!
//! ```text
//! Group(closer) := Primary (LogicalOp Primary)*
//! Primary       := '(' Group(')') | 'not' Primary | Feature
//! ```
//!
//! 没有运算符优先级，分组完全由括号决定。同一层级只允许一种逻辑运算符，
//! 混用时不报错，而是生成 `InvalidGroup` 节点。
//!
//! ## 解析示例
//!
//! ```text
//! (display: grid)                          → Declaration("display:grid")
//! (a:1) and (b:2)                          → And[a:1, b:2]
//! (a:1) and ((b:2) or (c:3))               → And[a:1, Or[b:2, c:3]]
//! (a:1) and (b:2) or (c:3)                 → InvalidGroup[a:1, b:2, c:3]
//! not (selector(h2 > p))                   → Not(Function("selector(h2>p)"))
//! ```

use log::debug;
use thiserror::Error;

use crate::ast::{normalize_key, SupportsAst};
use crate::lexer::tokenize;
use crate::token::{Feature, FeatureKind, Span, Token, TokenKind};

/// 括号和 not 的最大嵌套层数
pub const MAX_DEPTH: usize = 256;

/// 解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// 条件字符串去掉空白后为空
    #[error("Empty condition provided")]
    EmptyInput,

    /// 语法不允许出现的 token
    #[error("Unexpected token: '{value}'")]
    UnexpectedToken { value: String, span: Span },

    /// 缺少必需的结束符
    #[error("Expected token: '{expected}'")]
    ExpectedToken {
        expected: &'static str,
        /// 出现在结束符位置上的 token，输入已结束时为 `None`
        found: Option<Span>,
    },

    /// 没有更多 token，也没有可以报告的值
    #[error("Invalid supports syntax: '{input}'")]
    InvalidSyntax { input: String },

    /// 括号或 not 嵌套超过 [`MAX_DEPTH`] 层
    #[error("Nesting too deep: more than {} levels", MAX_DEPTH)]
    NestingTooDeep { span: Span },
}

impl ParseError {
    fn unexpected(token: &Token<'_>) -> Self {
        Self::UnexpectedToken {
            value: token.raw.to_string(),
            span: token.span,
        }
    }
}

/// 一个分组期望的结束符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    RParen,
    End,
}

/// 分组中出现过的逻辑运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    And,
    Or,
    Mixed,
}

pub struct Parser<'a> {
    /// 原始条件字符串，用于错误信息
    input: &'a str,
    tokens: &'a [Token<'a>],
    position: usize,
    /// 当前的括号 / not 嵌套层数
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, tokens: &'a [Token<'a>]) -> Self {
        Self {
            input,
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// 进入一层嵌套，超过上限时返回错误
    fn enter(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::NestingTooDeep { span: token.span });
        }
        self.depth += 1;
        Ok(())
    }

    /// 解析整个 token 序列，所有 token 都必须被消费
    pub fn parse(&mut self) -> Result<SupportsAst, ParseError> {
        self.parse_group(Closer::End)
    }

    /// 解析一个分组：`Primary (LogicalOp Primary)*`，并校验结束符
    fn parse_group(&mut self, closer: Closer) -> Result<SupportsAst, ParseError> {
        let first = self.parse_primary()?;
        let mut rest = Vec::new();
        let mut group: Option<GroupKind> = None;

        let next = loop {
            let next = self.advance();
            let op = match next.map(|token| &token.kind) {
                Some(TokenKind::And) => GroupKind::And,
                Some(TokenKind::Or) => GroupKind::Or,
                _ => break next,
            };
            // 第一个运算符决定本层级的类型，之后出现不同的运算符则整层无效
            group = Some(match group {
                None => op,
                Some(kind) if kind == op => kind,
                Some(_) => GroupKind::Mixed,
            });
            rest.push(self.parse_primary()?);
        };

        match (closer, next) {
            (Closer::RParen, Some(token)) if token.kind == TokenKind::RParen => {}
            (Closer::RParen, found) => {
                return Err(ParseError::ExpectedToken {
                    expected: ")",
                    found: found.map(|token| token.span),
                })
            }
            (Closer::End, None) => {}
            (Closer::End, Some(token)) => return Err(ParseError::unexpected(token)),
        }

        let Some(kind) = group else {
            return Ok(first);
        };

        let mut children = Vec::with_capacity(rest.len() + 1);
        children.push(first);
        children.extend(rest);

        Ok(match kind {
            GroupKind::And => SupportsAst::And(children),
            GroupKind::Or => SupportsAst::Or(children),
            GroupKind::Mixed => SupportsAst::InvalidGroup(children),
        })
    }

    /// 解析基础表达式
    ///
    /// - `(group)` - 括号分组
    /// - `not primary` - 逻辑非
    /// - 特性原子 - 叶子节点
    fn parse_primary(&mut self) -> Result<SupportsAst, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::InvalidSyntax {
                input: self.input.to_string(),
            });
        };

        match &token.kind {
            TokenKind::LParen => {
                self.enter(token)?;
                let group = self.parse_group(Closer::RParen);
                self.depth -= 1;
                group
            }
            TokenKind::Not => {
                self.enter(token)?;
                let inner = self.parse_primary();
                self.depth -= 1;
                Ok(SupportsAst::Not(Box::new(inner?)))
            }
            TokenKind::Feature(feature) => Ok(leaf(feature, token.raw)),
            TokenKind::RParen | TokenKind::And | TokenKind::Or => Err(ParseError::unexpected(token)),
        }
    }
}

/// 根据原子类型生成叶子节点，键由原始文本规范化得到
fn leaf(feature: &Feature<'_>, raw: &str) -> SupportsAst {
    let key = normalize_key(raw);
    match feature.kind {
        FeatureKind::Declaration => SupportsAst::Declaration(key),
        FeatureKind::Function => SupportsAst::Function(key),
        FeatureKind::Invalid => SupportsAst::InvalidAtom(key),
    }
}

/// 解析一个 `@supports` 条件（不含 `@supports` 前缀）
pub fn parse(condition: &str) -> Result<SupportsAst, ParseError> {
    if condition.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let tokens = tokenize(condition);
    let ast = Parser::new(condition, &tokens).parse()?;
    debug!("parsed {:?} into {:?}", condition, ast);
    Ok(ast)
}
