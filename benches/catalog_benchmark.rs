use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use delta_classic::host::memory::MemoryHost;
use delta_classic::query::parser::StatementParser;
use delta_classic::{AttachOptions, Extension};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use rand::Rng;
use tempfile::TempDir;

/// Helper to write a one-commit Delta table
fn write_table(table: &Path, files: u64) {
    let log = table.join("_delta_log");
    fs::create_dir_all(&log).unwrap();
    let mut commit = fs::File::create(log.join(format!("{:020}.json", 0))).unwrap();
    let schema = serde_json::json!({
        "type": "struct",
        "fields": [{"name": "id", "type": "long", "nullable": false, "metadata": {}}]
    });
    writeln!(commit, "{}", serde_json::json!({"metaData": {"schemaString": schema.to_string()}})).unwrap();
    for i in 0..files {
        let stats = serde_json::json!({"numRecords": 100}).to_string();
        writeln!(
            commit,
            "{}",
            serde_json::json!({"add": {"path": format!("part-{}.parquet", i), "size": 1024, "stats": stats}})
        ).unwrap();
    }
}

/// Multi-schema root with `schemas` x `tables` tables
fn create_root(schemas: usize, tables: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for s in 0..schemas {
        for t in 0..tables {
            write_table(&dir.path().join(format!("schema{}/table{}", s, t)), 4);
        }
    }
    dir
}

/// Benchmark attach + detach of roots of growing size
fn bench_attach_detach(c: &mut Criterion) {
    let mut group = c.benchmark_group("attach_detach");

    for tables in [1, 10, 50].iter() {
        let root = create_root(4, *tables);
        let path = root.path().to_string_lossy().into_owned();
        let ext = Extension::with_host(Arc::new(MemoryHost::new()));

        group.bench_with_input(
            BenchmarkId::from_parameter(tables * 4),
            &path,
            |b, path| {
                b.iter(|| {
                    ext.attach("bench", path, AttachOptions::default()).unwrap();
                    ext.detach("bench").unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark binding random tables, pinned and unpinned
fn bench_bind_table(c: &mut Criterion) {
    let root = create_root(4, 25);
    let path = root.path().to_string_lossy().into_owned();
    let ext = Extension::with_host(Arc::new(MemoryHost::new()));
    ext.attach("live", &path, AttachOptions::default()).unwrap();
    ext.attach("pinned", &path, AttachOptions { pin_snapshot: true }).unwrap();

    let mut group = c.benchmark_group("bind_table");
    for database in ["live", "pinned"] {
        group.bench_function(database, |b| {
            let mut rng = rand::thread_rng();
            b.iter(|| {
                let schema = format!("schema{}", rng.gen_range(0..4));
                let table = format!("table{}", rng.gen_range(0..25));
                black_box(ext.bind_table(database, &schema, &table).unwrap());
            });
        });
    }
    group.finish();
}

/// Benchmark statement classification
fn bench_classify(c: &mut Criterion) {
    let parser = StatementParser::new();
    let statements = [
        "SELECT COUNT(*) FROM sdb.main.table_a a, mdb.schema1.table_x x WHERE a.id = x.id",
        "ATTACH OR REPLACE '/data/warehouse' AS wh (TYPE delta_classic, PIN_SNAPSHOT)",
        "INSERT INTO wh.sales.orders SELECT * FROM staging.orders",
        "CREATE UNIQUE INDEX idx_orders ON wh.sales.orders (id)",
    ];

    c.bench_function("classify_statement", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let sql = statements[rng.gen_range(0..statements.len())];
            black_box(parser.parse(sql).unwrap());
        });
    });
}

criterion_group!(benches, bench_attach_detach, bench_bind_table, bench_classify);
criterion_main!(benches);
