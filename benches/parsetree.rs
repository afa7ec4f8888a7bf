use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parsetree::{NodeId, Tree};

fn make_parse_tree(size: usize) -> (Tree, Option<NodeId>) {
    let mut tree = Tree::with_capacity(size);

    if size == 0 {
        return (tree, None);
    }

    let root = tree.add_node("n0");
    let mut ids = Vec::with_capacity(size);
    ids.push(root);

    for i in 1..size {
        let node = tree.add_node(format!("n{i}"));
        tree.add_branch(ids[(i - 1) / 8], node).unwrap();
        ids.push(node);
    }

    (tree, Some(root))
}

fn bench_build_tree(c: &mut Criterion) {
    let mut g = c.benchmark_group("tree creation");

    for size in [0, 100, 10_000, 1_000_000] {
        g.bench_with_input(
            BenchmarkId::new("make_parse_tree", size),
            &size,
            |b, size| b.iter(|| black_box(make_parse_tree(*size))),
        );
    }
}

fn bench_walk_tree(c: &mut Criterion) {
    let mut g = c.benchmark_group("tree traversal");

    for size in [100, 10_000, 1_000_000] {
        g.bench_with_input(BenchmarkId::new("enumerate", size), &size, |b, size| {
            let (tree, root) = make_parse_tree(*size);
            let root = root.unwrap();
            b.iter(|| black_box(tree.enumerate(root)))
        });

        g.bench_with_input(BenchmarkId::new("count", size), &size, |b, size| {
            let (tree, root) = make_parse_tree(*size);
            let root = root.unwrap();
            b.iter(|| black_box(tree.count(root)))
        });
    }
}

fn bench_find_path(c: &mut Criterion) {
    let mut g = c.benchmark_group("path lookup");

    for depth in [4, 16, 64] {
        g.bench_with_input(BenchmarkId::new("find", depth), &depth, |b, depth| {
            let mut tree = Tree::new();
            let root = tree.add_node("n");
            let mut cursor = root;
            let mut path = String::from("n");

            for _ in 0..*depth {
                let node = tree.add_node("n");
                cursor = tree.add_branch(cursor, node).unwrap();
                path.push_str("/n");
            }

            b.iter(|| black_box(tree.find(root, &path)))
        });
    }
}

criterion_group!(benches, bench_build_tree, bench_walk_tree, bench_find_path);
criterion_main!(benches);
