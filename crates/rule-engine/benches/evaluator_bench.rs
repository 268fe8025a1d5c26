//! 规则引擎性能基准测试
//!
//! 覆盖条件评估、规则编译以及整棵 AST 的评估。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rule_engine::{
    ComparisonOperator, ConditionEvaluator, EvaluationContext, Literal, RuleExecutor, combine,
    compile,
};
use serde_json::{Value, json};
use std::hint::black_box;

const EXAMPLE_RULE: &str = "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)";

fn create_context() -> EvaluationContext {
    EvaluationContext::from_value(json!({
        "age": 35,
        "department": "Sales",
        "salary": 60000,
        "experience": 3
    }))
    .unwrap_or_default()
}

/// 单个比较条件评估基准
fn bench_condition(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition");

    let number = json!(1000);
    let text = json!("Sales");
    let numeric_string = json!(" 1000 ");

    let cases: [(&str, &Value, ComparisonOperator, Literal); 4] = [
        ("numeric_gt", &number, ComparisonOperator::Gt, Literal::from(500)),
        ("string_eq", &text, ComparisonOperator::Eq, Literal::from("sales")),
        ("string_lt", &text, ComparisonOperator::Lt, Literal::from("Tech")),
        ("coerced_eq", &numeric_string, ComparisonOperator::Eq, Literal::from(1000)),
    ];

    for (name, field, op, literal) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| {
                ConditionEvaluator::evaluate(
                    black_box(Some(*field)),
                    black_box(op),
                    black_box(literal),
                )
            })
        });
    }

    group.finish();
}

/// 规则编译基准
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    group.bench_function("example_rule", |b| b.iter(|| compile(black_box(EXAMPLE_RULE))));

    for count in [2usize, 8, 32] {
        let rules: Vec<String> = (0..count).map(|i| format!("field_{i} >= {i}")).collect();
        group.bench_with_input(BenchmarkId::new("combine", count), &rules, |b, rules| {
            b.iter(|| combine(black_box(rules.as_slice())))
        });
    }

    group.finish();
}

/// AST 评估基准
fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");

    let ctx = create_context();
    let Ok(ast) = compile(EXAMPLE_RULE) else {
        return;
    };

    let executor = RuleExecutor::new();
    group.bench_function("example_rule", |b| {
        b.iter(|| executor.evaluate(black_box(&ast), black_box(&ctx)))
    });

    let tracing_executor = RuleExecutor::new().with_trace();
    group.bench_function("example_rule_traced", |b| {
        b.iter(|| tracing_executor.execute(black_box(&ast), black_box(&ctx)))
    });

    group.finish();
}

criterion_group!(benches, bench_condition, bench_compile, bench_execute);
criterion_main!(benches);
