use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlweave::{Compiler, Dialect, Find, Save};

/// SELECT with `n` fields and `n` bound conditions, half of them bracketed ORs.
fn build_find(n: usize) -> Find {
    let fields: Vec<String> = (0..n).map(|i| format!("t.col{i}")).collect();
    let mut find = Find::new().in_("things t").get(fields);
    for i in 0..n {
        let expr = format!("t.col{i} >");
        find = if i % 2 == 0 {
            find.open().where_(&expr, i as i64)
        } else {
            find.or_where(&expr, i as i64).close()
        };
    }
    find.sort_desc("t.col0").limit_offset(50, 100)
}

fn build_insert(rows: usize) -> Save {
    let tuples = (0..rows).map(|i| {
        vec![
            ("id", sqlweave::Value::from(i as i64)),
            ("name", sqlweave::Value::from(format!("row{i}"))),
            ("active", sqlweave::Value::from(i % 2 == 0)),
        ]
    });
    Save::new().in_("things").data_set(tuples)
}

fn bench_compile_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/find");

    for n in [1, 5, 10, 50] {
        let find = build_find(n);
        for dialect in [Dialect::Sql, Dialect::Mysql, Dialect::Pgsql] {
            let compiler = Compiler::new(dialect);
            group.bench_with_input(
                BenchmarkId::new(dialect.name(), n),
                &find,
                |b, find| b.iter(|| black_box(compiler.build(find))),
            );
        }
    }

    group.finish();
}

fn bench_build_and_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/build_and_compile");
    let compiler = Compiler::new(Dialect::Pgsql);

    for n in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(compiler.build(&build_find(n))));
        });
    }

    group.finish();
}

fn bench_compile_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/insert");
    let compiler = Compiler::new(Dialect::Sql);

    for rows in [1, 10, 100] {
        let save = build_insert(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &save, |b, save| {
            b.iter(|| black_box(compiler.build(save)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile_find,
    bench_build_and_compile,
    bench_compile_insert
);
criterion_main!(benches);
