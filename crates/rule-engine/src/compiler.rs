//! 规则编译器
//!
//! 将中缀形式的规则文本编译为二叉 AST：词法分析后使用调度场算法
//! (shunting-yard) 转为逆波兰序列，再由逆波兰序列构建树。
//! AND 优先级高于 OR，两者均为左结合。

use crate::error::{Result, RuleError, SyntaxError};
use crate::lexer::{self, TokenKind};
use crate::models::Node;
use crate::operators::LogicalOperator;
use tracing::debug;

/// AST 最大深度（叶子节点深度为 1）
///
/// 求值、序列化与释放都沿树递归，深度必须有界；该上限同时保证
/// 编译结果能以 JSON 形式原样提交给评估接口。
pub const MAX_DEPTH: usize = 100;

/// 操作符栈中的元素
enum StackEntry {
    Connective(LogicalOperator, usize),
    LeftParen(usize),
}

/// 逆波兰输出序列中的元素
enum RpnItem {
    Operand(Node),
    Connective(LogicalOperator, usize),
}

/// 编译规则文本
pub fn compile(rule_text: &str) -> Result<Node> {
    let tokens = lexer::tokenize(rule_text)?;
    let rpn = to_rpn(tokens.into_iter().map(|t| (t.kind, t.position)))?;
    let ast = build_tree(rpn)?;

    debug!(rule = %rule_text, ast = %ast, "规则编译完成");
    Ok(ast)
}

/// 合并多条规则
///
/// 空列表返回 `None`；否则以 AND 依次把后续规则挂到累加结果的右侧，
/// 形成左倾链。任意一条规则编译失败都会中止合并，并指明其下标。
pub fn combine<S: AsRef<str>>(rule_texts: &[S]) -> Result<Option<Node>> {
    let mut combined: Option<(Node, usize)> = None;

    for (index, text) in rule_texts.iter().enumerate() {
        let ast = compile(text.as_ref()).map_err(|e| match e {
            RuleError::Syntax(source) => RuleError::CombineFailed { index, source },
            other => other,
        })?;
        let depth = ast.depth();

        combined = Some(match combined {
            None => (ast, depth),
            Some((acc, acc_depth)) => {
                let depth = acc_depth.max(depth) + 1;
                if depth > MAX_DEPTH {
                    return Err(RuleError::CombineFailed {
                        index,
                        source: SyntaxError::TooDeep { limit: MAX_DEPTH },
                    });
                }
                (Node::and(acc, ast), depth)
            }
        });
    }

    debug!(count = rule_texts.len(), "规则合并完成");
    Ok(combined.map(|(ast, _)| ast))
}

/// 调度场算法：中缀词法单元 → 逆波兰序列
fn to_rpn(tokens: impl IntoIterator<Item = (TokenKind, usize)>) -> Result<Vec<RpnItem>> {
    let mut output = Vec::new();
    let mut stack: Vec<StackEntry> = Vec::new();

    for (kind, position) in tokens {
        match kind {
            TokenKind::Connective(op) => {
                while let Some(StackEntry::Connective(top, _)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    if let Some(StackEntry::Connective(top, pos)) = stack.pop() {
                        output.push(RpnItem::Connective(top, pos));
                    }
                }
                stack.push(StackEntry::Connective(op, position));
            }
            TokenKind::LeftParen => stack.push(StackEntry::LeftParen(position)),
            TokenKind::RightParen => loop {
                match stack.pop() {
                    Some(StackEntry::LeftParen(_)) => break,
                    Some(StackEntry::Connective(op, pos)) => {
                        output.push(RpnItem::Connective(op, pos));
                    }
                    None => return Err(SyntaxError::UnbalancedParenthesis { position }.into()),
                }
            },
            TokenKind::Comparison(cond) => output.push(RpnItem::Operand(Node::Operand(cond))),
        }
    }

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Connective(op, pos) => output.push(RpnItem::Connective(op, pos)),
            StackEntry::LeftParen(position) => {
                return Err(SyntaxError::UnbalancedParenthesis { position }.into());
            }
        }
    }

    Ok(output)
}

/// 逆波兰序列 → AST，先弹出的是右子树
///
/// 栈中每个子树都带着自身深度，超过 [`MAX_DEPTH`] 立即失败。
fn build_tree(rpn: Vec<RpnItem>) -> Result<Node> {
    let mut stack: Vec<(Node, usize)> = Vec::new();

    for item in rpn {
        match item {
            RpnItem::Operand(node) => stack.push((node, 1)),
            RpnItem::Connective(op, position) => {
                let (Some((right, right_depth)), Some((left, left_depth))) =
                    (stack.pop(), stack.pop())
                else {
                    return Err(SyntaxError::MissingOperand {
                        connective: op.to_string(),
                        position,
                    }
                    .into());
                };
                let depth = left_depth.max(right_depth) + 1;
                if depth > MAX_DEPTH {
                    return Err(SyntaxError::TooDeep { limit: MAX_DEPTH }.into());
                }
                stack.push((Node::operator(op, left, right), depth));
            }
        }
    }

    match stack.len() {
        0 => Err(SyntaxError::EmptyExpression.into()),
        1 => stack
            .pop()
            .map(|(node, _)| node)
            .ok_or_else(|| SyntaxError::EmptyExpression.into()),
        count => Err(SyntaxError::MissingConnective { count }.into()),
    }
}
