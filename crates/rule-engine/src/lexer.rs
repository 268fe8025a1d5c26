//! 规则文本词法分析
//!
//! 识别逻辑关键字、括号以及 `字段 比较符 值` 形式的比较条件。
//! 未被任何模式匹配的非空白片段直接报错，而不是静默丢弃。

use crate::error::SyntaxError;
use crate::models::{Comparison, Literal};
use crate::operators::{ComparisonOperator, LogicalOperator};
use regex::Regex;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<and>\bAND\b)|(?P<or>\bOR\b)|(?P<lparen>\()|(?P<rparen>\))|(?P<cmp>\w+\s*(?:<=|>=|<|>|=)\s*(?:'[^']*'|-?\d+(?:\.\d+)?))",
    )
    .unwrap_or_else(|e| panic!("invalid token pattern: {e}"))
});

static CLAUSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<field>\w+)\s*(?P<op><=|>=|<|>|=)\s*(?P<value>.+)$")
        .unwrap_or_else(|e| panic!("invalid clause pattern: {e}"))
});

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Connective(LogicalOperator),
    LeftParen,
    RightParen,
    Comparison(Comparison),
}

/// 词法单元，`position` 为源文本中的字符偏移
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// 将规则文本切分为词法单元
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for caps in TOKEN_PATTERN.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        check_gap(source, last_end, whole.start())?;
        last_end = whole.end();

        let position = char_offset(source, whole.start());
        let kind = if caps.name("and").is_some() {
            TokenKind::Connective(LogicalOperator::And)
        } else if caps.name("or").is_some() {
            TokenKind::Connective(LogicalOperator::Or)
        } else if caps.name("lparen").is_some() {
            TokenKind::LeftParen
        } else if caps.name("rparen").is_some() {
            TokenKind::RightParen
        } else {
            TokenKind::Comparison(split_comparison(whole.as_str(), position)?)
        };

        tokens.push(Token { kind, position });
    }

    check_gap(source, last_end, source.len())?;
    Ok(tokens)
}

/// 将比较条件拆分为字段、比较符和字面量
pub fn split_comparison(clause: &str, position: usize) -> Result<Comparison, SyntaxError> {
    let clause = clause.trim();
    let caps = CLAUSE_PATTERN
        .captures(clause)
        .ok_or_else(|| SyntaxError::MalformedComparison {
            position,
            clause: clause.to_string(),
        })?;

    match (caps.name("field"), caps.name("op"), caps.name("value")) {
        (Some(field), Some(op), Some(value)) => Ok(Comparison {
            field: field.as_str().to_string(),
            operator: ComparisonOperator::parse(op.as_str()),
            literal: Literal::from_token(value.as_str()),
        }),
        _ => Err(SyntaxError::MalformedComparison {
            position,
            clause: clause.to_string(),
        }),
    }
}

/// 两个词法单元之间只允许出现空白
fn check_gap(source: &str, start: usize, end: usize) -> Result<(), SyntaxError> {
    let gap = &source[start..end];
    let trimmed = gap.trim_start();
    if trimmed.trim_end().is_empty() {
        return Ok(());
    }

    let leading = gap.len() - trimmed.len();
    Err(SyntaxError::UnexpectedInput {
        position: char_offset(source, start + leading),
        fragment: trimmed.trim_end().to_string(),
    })
}

fn char_offset(source: &str, byte_offset: usize) -> usize {
    source[..byte_offset].chars().count()
}
