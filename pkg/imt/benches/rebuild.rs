use std::hint::black_box;

use benchy::{benchmark, BenchmarkRun};
use imt::{Element, IndexedTree, NoopHashCache, SimpleHashCache, CAPACITY};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

fn entries(n: usize) -> Vec<(u64, Element)> {
    let mut rng = ChaChaRng::seed_from_u64(0);
    (0..n)
        .map(|_| (rng.gen(), Element::secure_random(&mut rng)))
        .collect()
}

#[benchmark]
pub fn fill_tree(b: &mut BenchmarkRun) {
    let entries = entries(CAPACITY);
    zk_primitives::reset_hash_count();

    b.run(|| {
        let mut tree = IndexedTree::<NoopHashCache>::new();
        for &(key, value) in &entries {
            tree.insert_leaf(key, value).unwrap();
        }

        black_box(tree);
    });

    b.metrics
        .insert("hash_count".into(), zk_primitives::hash_count());
}

#[benchmark]
pub fn fill_tree_cached(b: &mut BenchmarkRun) {
    let entries = entries(CAPACITY);
    zk_primitives::reset_hash_count();

    b.run(|| {
        let mut tree = IndexedTree::new_with_cache(SimpleHashCache::new());
        for &(key, value) in &entries {
            tree.insert_leaf(key, value).unwrap();
        }

        black_box(tree);
    });

    b.metrics
        .insert("hash_count".into(), zk_primitives::hash_count());
}

#[benchmark]
pub fn generate_all_proofs(b: &mut BenchmarkRun) {
    let mut tree = IndexedTree::<NoopHashCache>::new();
    tree.insert_leaves(entries(CAPACITY)).unwrap();

    b.run(|| {
        for idx in 0..CAPACITY as u32 {
            let proof = tree.generate_proof(idx).unwrap();
            black_box(tree.verify_proof(&proof));
        }
    });
}

benchy::main!(fill_tree, fill_tree_cached, generate_all_proofs);
