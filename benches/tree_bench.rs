use criterion::{criterion_group, criterion_main, Criterion};
use lagerwald::attachments::items;
use lagerwald::db;
use lagerwald::hierarchy::{self, aggregate};
use lagerwald::types::{CloneFolderRequest, CreateFolderRequest, CreateItemRequest};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::runtime::Runtime;

async fn create_test_tree(
    depth: usize,
    folders_per_level: usize,
    items_per_folder: usize,
) -> (SqlitePool, i64) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_db(&pool).await.unwrap();

    let root = hierarchy::create_folder(
        &pool,
        &CreateFolderRequest {
            name: "root".to_string(),
            parent_id: None,
            description: None,
            notes: None,
            tags: None,
        },
    )
    .await
    .unwrap()
    .id;

    let mut frontier = vec![(root, 0usize)];
    while let Some((folder, level)) = frontier.pop() {
        for i in 0..items_per_folder {
            items::create_item(
                &pool,
                &CreateItemRequest {
                    name: format!("item_{}", i),
                    description: None,
                    notes: None,
                    tags: None,
                    quantity: Some(1.5),
                    unit: None,
                    folder_id: Some(folder),
                },
            )
            .await
            .unwrap();
        }
        if level < depth {
            for i in 0..folders_per_level {
                let child = hierarchy::create_folder(
                    &pool,
                    &CreateFolderRequest {
                        name: format!("folder_{}_{}", level, i),
                        parent_id: Some(folder),
                        description: None,
                        notes: None,
                        tags: None,
                    },
                )
                .await
                .unwrap()
                .id;
                frontier.push((child, level + 1));
            }
        }
    }

    (pool, root)
}

fn benchmark_subtree_fetch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (pool, root) = rt.block_on(create_test_tree(3, 3, 5));

    c.bench_function("get_folder_subtree", |b| {
        b.iter(|| {
            let tree = rt.block_on(hierarchy::get_folder(&pool, root)).unwrap();
            assert!(!tree.subfolders.is_empty());
        })
    });
}

fn benchmark_total_quantity(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (pool, root) = rt.block_on(create_test_tree(4, 3, 5));

    c.bench_function("total_quantity_subtree", |b| {
        b.iter(|| {
            let total = rt.block_on(aggregate::total_quantity(&pool, Some(root))).unwrap();
            assert!(total > 0.0);
        })
    });
}

fn benchmark_clone_and_delete(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (pool, root) = rt.block_on(create_test_tree(3, 2, 3));

    c.bench_function("clone_delete_subtree", |b| {
        b.iter(|| {
            let clone = rt
                .block_on(hierarchy::clone_folder(
                    &pool,
                    root,
                    &CloneFolderRequest::default(),
                    " (Cloned)",
                ))
                .unwrap();
            rt.block_on(hierarchy::delete_folder(&pool, clone.id)).unwrap();
        })
    });
}

criterion_group!(benches, benchmark_subtree_fetch, benchmark_total_quantity, benchmark_clone_and_delete);
criterion_main!(benches);
