use std::{sync::LazyLock, time::Duration};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lexgram::tokenizers::{
    CharRunTokenizer, CommentTokenizer, IgnoreTokenizer, SymbolTokenizer, INTEGER_CHARS,
    WORD_CHARS,
};
use lexgram::{compile_program, Grammar, Grouper, Matcher, Pipeline, PipelineBuilder};

static PIPELINE: LazyLock<Pipeline> = LazyLock::new(|| {
    PipelineBuilder::new()
        .add_tokenizer(CommentTokenizer::new([("//", "\n"), ("/*", "*/")]))
        .add_tokenizer(SymbolTokenizer::new([
            ("=", "set"),
            ("+", "add"),
            ("-", "subtract"),
            ("*", "multiply"),
            ("/", "divide"),
            ("(", "open-parenthesis"),
            (")", "close-parenthesis"),
            ("{", "open-curly-brace"),
            ("}", "close-curly-brace"),
            (";", "semicolon"),
        ]))
        .add_tokenizer(CharRunTokenizer::new("integer", INTEGER_CHARS))
        .add_tokenizer(CharRunTokenizer::new("word", WORD_CHARS))
        .add_tokenizer(IgnoreTokenizer::new(" \t\r\n"))
        .build()
});

static GRAMMAR: LazyLock<Grammar> = LazyLock::new(|| {
    compile_program(
        "@set statement\n\
         define_variable let l:name,:word = l:value,:*,>:1,<:inf,j:expression ;\n\
         @set expression\n\
         group l:children,:group-parenthesis,j:expression\n\
         operator +,-,*,/\n\
         number :integer\n\
         variable l:name,:word\n",
    )
    .unwrap()
});

static INPUT: LazyLock<String> = LazyLock::new(|| {
    let mut input = String::new();
    for i in 0..1_000 {
        input.push_str(&format!(
            "// line {i}\nlet value = (1 + value) * {i}; /* trailing */\n"
        ));
    }
    input
});

fn scan_benchmark(c: &mut Criterion) {
    c.bench_function("scan_benchmark", |b| {
        b.iter(|| {
            black_box(PIPELINE.scan(&INPUT).unwrap());
        });
    });
}

fn match_benchmark(c: &mut Criterion) {
    let statement = GRAMMAR.set_id("statement").unwrap();
    let matcher = Matcher::new(&GRAMMAR);
    let grouper = Grouper::default();
    c.bench_function("match_benchmark", |b| {
        b.iter(|| {
            black_box(
                matcher
                    .match_source(&INPUT, &PIPELINE, &grouper, statement)
                    .unwrap(),
            );
        });
    });
}

fn compile_benchmark(c: &mut Criterion) {
    c.bench_function("compile_benchmark", |b| {
        b.iter(|| {
            black_box(
                compile_program(
                    "@set statement\n\
                     define_variable let l:name,:word = l:value,:*,>:1,<:inf ;\n",
                )
                .unwrap(),
            );
        });
    });
}

criterion_group! {
    name = benchespipeline;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = scan_benchmark, match_benchmark
}

criterion_group! {
    name = benchescompiler;
    config = Criterion::default();
    targets = compile_benchmark
}

criterion_main!(benchespipeline, benchescompiler);
