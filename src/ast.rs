use serde::Serialize;

/// 表示一个 `@supports` 条件的表达式树
///
/// 序列化后的结构为 `{ "type": ..., "node": ... }`，
/// 例如 `{"type":"declaration","node":"display:grid"}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "node", rename_all = "lowercase")]
pub enum SupportsAst {
    /// `name: value` 形式的特性检测，键已规范化
    Declaration(String),
    /// `name(args)` 形式的特性检测，键已规范化
    Function(String),
    /// 既不是声明也不是函数的原子
    #[serde(rename = "invalid")]
    InvalidAtom(String),
    /// 逻辑非运算 (not)
    Not(Box<SupportsAst>),
    /// 逻辑与运算 (and)
    And(Vec<SupportsAst>),
    /// 逻辑或运算 (or)
    Or(Vec<SupportsAst>),
    /// 同一层级混用了 and 和 or，没有逻辑含义
    #[serde(rename = "invalid")]
    InvalidGroup(Vec<SupportsAst>),
}

/// 把原子的原始文本规范化为键：去掉所有空白并转为小写
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
