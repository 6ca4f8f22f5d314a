//! Parse and restore throughput for typical memo sizes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use memos_core::markdown::{ParseOptions, parse, parse_with, restore};

fn sample_memo(sections: usize) -> String {
    let mut doc = String::new();
    for i in 0..sections {
        doc.push_str(&format!("## Section {i}\n\n"));
        doc.push_str("Some notes with `inline code` and a #tag.\n");
        doc.push_str("- [ ] follow up\n  - [x] nested done\n1. first\n2. second\n");
        doc.push_str("```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\n");
    }
    doc
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_parse");
    for sections in [1usize, 10, 100] {
        let doc = sample_memo(sections);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("nested", sections), &doc, |b, doc| {
            b.iter(|| parse(black_box(doc)))
        });
        group.bench_with_input(BenchmarkId::new("flat", sections), &doc, |b, doc| {
            b.iter(|| parse_with(black_box(doc), ParseOptions::flat()))
        });
    }
    group.finish();
}

fn bench_restore(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_restore");
    for sections in [1usize, 10, 100] {
        let nodes = parse(&sample_memo(sections));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &nodes, |b, nodes| {
            b.iter(|| restore(black_box(nodes)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_restore);
criterion_main!(benches);
