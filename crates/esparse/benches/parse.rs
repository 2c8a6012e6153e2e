//! Parser benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use esparse::{parse_module, Lexer, ParserOptions, TokenKind};

const SAMPLE_SOURCE: &str = r#"
// Sample JavaScript code for benchmarking
function fibonacci(n) {
    if (n <= 1) return n;
    return fibonacci(n - 1) + fibonacci(n - 2);
}

class Calculator {
    #history = [];

    constructor() {
        this.result = 0;
    }

    add(x, y) {
        return x + y;
    }

    multiply(x, y) {
        return x * y;
    }

    async fetchData(url) {
        const response = await fetch(url);
        return response?.json() ?? null;
    }
}

const calc = new Calculator();
const numbers = [1, 2, 3, 4, 5].map(n => n * 2);
const { a, b, ...rest } = { a: 1, b: 2, c: 3, d: 4 };
const template = `Hello ${a}, you have ${b} messages`;
const pattern = /^[a-z]+$/giu;

export { Calculator, fibonacci };
export default calc;
"#;

/// Tokens after which a `/` is division rather than the start of a regex.
fn ends_operand(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::PrivateName(_)
            | TokenKind::String(_)
            | TokenKind::Number(_)
            | TokenKind::BigInt(_)
            | TokenKind::Regex { .. }
            | TokenKind::TemplateNoSub(_)
            | TokenKind::This
            | TokenKind::Super
            | TokenKind::Null
            | TokenKind::True
            | TokenKind::False
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
    )
}

fn bench_lexer(c: &mut Criterion) {
    // Template substitutions need the parser to rescan `}`, so the lexer
    // sample drops the line that uses them.
    let source: String = SAMPLE_SOURCE
        .lines()
        .filter(|line| !line.contains("${"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(&source)).with_module(true);
            let mut allow_regex = true;
            loop {
                let token = lexer
                    .next_token(allow_regex)
                    .unwrap_or_else(|err| panic!("sample failed to lex: {err}"));
                if token.kind == TokenKind::Eof {
                    break;
                }
                allow_regex = !ends_operand(&token.kind);
            }
        });
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("module", |b| {
        b.iter(|| parse_module(black_box(SAMPLE_SOURCE), ParserOptions::default()))
    });

    let options = ParserOptions::default().with_loc(true).with_ranges(true).with_raw(true);
    group.bench_function("module_to_estree", |b| {
        b.iter(|| {
            parse_module(black_box(SAMPLE_SOURCE), options).map(|program| program.to_estree())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parse);
criterion_main!(benches);
