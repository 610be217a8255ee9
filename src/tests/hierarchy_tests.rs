#[cfg(test)]
mod tests {
    use crate::attachments::{images, items};
    use crate::error::AppError;
    use crate::types::{
        CloneFolderRequest, CreateFolderRequest, CreateImageRequest, CreateItemRequest,
        FolderTree, UpdateFolderRequest,
    };
    use crate::{db, hierarchy};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::init_db(&pool).await.unwrap();
        pool
    }

    async fn mk_folder(db: &SqlitePool, name: &str, parent_id: Option<i64>) -> i64 {
        hierarchy::create_folder(
            db,
            &CreateFolderRequest {
                name: name.to_string(),
                parent_id,
                description: None,
                notes: None,
                tags: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn mk_item(db: &SqlitePool, name: &str, folder_id: Option<i64>, quantity: f64) -> i64 {
        items::create_item(
            db,
            &CreateItemRequest {
                name: name.to_string(),
                description: None,
                notes: None,
                tags: None,
                quantity: Some(quantity),
                unit: None,
                folder_id,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn mk_image(
        db: &SqlitePool,
        filename: &str,
        item_id: Option<i64>,
        folder_id: Option<i64>,
    ) -> i64 {
        images::create_image(
            db,
            &CreateImageRequest {
                filename: filename.to_string(),
                filepath: format!("/uploads/{}", filename),
                description: None,
                item_id,
                folder_id,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_folder_under_missing_parent() {
        let pool = setup_test_db().await;
        let err = hierarchy::create_folder(
            &pool,
            &CreateFolderRequest {
                name: "orphan".to_string(),
                parent_id: Some(999),
                description: None,
                notes: None,
                tags: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_folder_empty_name() {
        let pool = setup_test_db().await;
        let err = hierarchy::create_folder(
            &pool,
            &CreateFolderRequest {
                name: "   ".to_string(),
                parent_id: None,
                description: None,
                notes: None,
                tags: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_get_folder_materializes_subtree() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let b = mk_folder(&pool, "B", Some(a)).await;
        let c = mk_folder(&pool, "C", Some(b)).await;
        let i1 = mk_item(&pool, "screws", Some(a), 10.0).await;
        let i2 = mk_item(&pool, "nails", Some(c), 4.0).await;
        mk_image(&pool, "box.jpg", None, Some(a)).await;
        mk_image(&pool, "screw.jpg", Some(i1), None).await;
        mk_image(&pool, "nail.jpg", Some(i2), None).await;

        let tree = hierarchy::get_folder(&pool, a).await.unwrap();
        assert_eq!(tree.id, a);
        assert_eq!(tree.items.len(), 1);
        assert_eq!(tree.items[0].images.len(), 1);
        assert_eq!(tree.images.len(), 1);
        assert_eq!(tree.subfolders.len(), 1);

        let b_node = &tree.subfolders[0];
        assert_eq!(b_node.id, b);
        assert!(b_node.items.is_empty());
        assert_eq!(b_node.subfolders.len(), 1);

        let c_node = &b_node.subfolders[0];
        assert_eq!(c_node.id, c);
        assert_eq!(c_node.items.len(), 1);
        assert_eq!(c_node.items[0].name, "nails");
        assert_eq!(c_node.items[0].images.len(), 1);
    }

    #[tokio::test]
    async fn test_get_folder_missing() {
        let pool = setup_test_db().await;
        let err = hierarchy::get_folder(&pool, 123).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_roots_pagination() {
        let pool = setup_test_db().await;
        let r1 = mk_folder(&pool, "r1", None).await;
        let r2 = mk_folder(&pool, "r2", None).await;
        let r3 = mk_folder(&pool, "r3", None).await;
        // Non-roots must never show up
        mk_folder(&pool, "child", Some(r1)).await;

        let all = hierarchy::list_roots(&pool, 0, 100).await.unwrap();
        assert_eq!(all.iter().map(|f| f.id).collect::<Vec<_>>(), vec![r1, r2, r3]);

        let page = hierarchy::list_roots(&pool, 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, r2);
    }

    #[tokio::test]
    async fn test_update_folder_patches_only_supplied_fields() {
        let pool = setup_test_db().await;
        let id = hierarchy::create_folder(
            &pool,
            &CreateFolderRequest {
                name: "garage".to_string(),
                parent_id: None,
                description: Some("east wall".to_string()),
                notes: None,
                tags: None,
            },
        )
        .await
        .unwrap()
        .id;

        let updated = hierarchy::update_folder(
            &pool,
            id,
            &UpdateFolderRequest { name: Some("garage 2".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "garage 2");
        assert_eq!(updated.description.as_deref(), Some("east wall"));

        let err = hierarchy::update_folder(&pool, 999, &UpdateFolderRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_folder_cascades_exactly() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let b = mk_folder(&pool, "B", Some(a)).await;
        let c = mk_folder(&pool, "C", Some(b)).await;
        let ia = mk_item(&pool, "in-a", Some(a), 1.0).await;
        let ic = mk_item(&pool, "in-c", Some(c), 2.0).await;
        mk_image(&pool, "a.jpg", None, Some(a)).await;
        mk_image(&pool, "ia.jpg", Some(ia), None).await;
        mk_image(&pool, "ic.jpg", Some(ic), None).await;

        // A sibling tree that must survive untouched
        let s = mk_folder(&pool, "S", None).await;
        let is_ = mk_item(&pool, "in-s", Some(s), 3.0).await;
        mk_image(&pool, "s.jpg", None, Some(s)).await;
        mk_image(&pool, "is.jpg", Some(is_), None).await;

        hierarchy::delete_folder(&pool, a).await.unwrap();

        for id in [a, b, c] {
            let err = hierarchy::get_folder(&pool, id).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }

        let folders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM folders").fetch_one(&pool).await.unwrap();
        let items: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM items").fetch_one(&pool).await.unwrap();
        let images: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM images").fetch_one(&pool).await.unwrap();
        assert_eq!(folders, 1);
        assert_eq!(items, 1);
        assert_eq!(images, 2);

        let survivor = hierarchy::get_folder(&pool, s).await.unwrap();
        assert_eq!(survivor.items.len(), 1);
        assert_eq!(survivor.images.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_folder_missing() {
        let pool = setup_test_db().await;
        let err = hierarchy::delete_folder(&pool, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_move_folder_rejects_self_parenting() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let err = hierarchy::move_folder(&pool, a, Some(a)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn test_move_folder_rejects_descendant_and_leaves_tree_unchanged() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let b = mk_folder(&pool, "B", Some(a)).await;
        let c = mk_folder(&pool, "C", Some(b)).await;

        let err = hierarchy::move_folder(&pool, a, Some(c)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOperation(_)));

        // No partial mutation
        let a_tree = hierarchy::get_folder(&pool, a).await.unwrap();
        assert_eq!(a_tree.parent_id, None);
        assert_eq!(a_tree.subfolders[0].id, b);
        assert_eq!(a_tree.subfolders[0].subfolders[0].id, c);
    }

    #[tokio::test]
    async fn test_move_folder_to_new_parent_and_root() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let b = mk_folder(&pool, "B", None).await;
        let c = mk_folder(&pool, "C", Some(a)).await;

        let moved = hierarchy::move_folder(&pool, c, Some(b)).await.unwrap();
        assert_eq!(moved.parent_id, Some(b));

        let rooted = hierarchy::move_folder(&pool, c, None).await.unwrap();
        assert_eq!(rooted.parent_id, None);
    }

    #[tokio::test]
    async fn test_move_folder_missing_target() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let err = hierarchy::move_folder(&pool, a, Some(777)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = hierarchy::move_folder(&pool, 777, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    fn collect_ids(tree: &FolderTree, out: &mut Vec<i64>) {
        out.push(tree.id);
        for sub in &tree.subfolders {
            collect_ids(sub, out);
        }
    }

    fn count_nodes(tree: &FolderTree) -> (usize, usize, usize) {
        let mut folders = 1;
        let mut items = tree.items.len();
        let mut images = tree.images.len() + tree.items.iter().map(|i| i.images.len()).sum::<usize>();
        for sub in &tree.subfolders {
            let (f, it, im) = count_nodes(sub);
            folders += f;
            items += it;
            images += im;
        }
        (folders, items, images)
    }

    #[tokio::test]
    async fn test_clone_folder_is_deep_and_isomorphic() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let b = mk_folder(&pool, "B", Some(a)).await;
        let c = mk_folder(&pool, "C", Some(b)).await;
        let i1 = mk_item(&pool, "bolts", Some(a), 7.5).await;
        mk_item(&pool, "nuts", Some(c), 3.0).await;
        mk_image(&pool, "a.jpg", None, Some(a)).await;
        mk_image(&pool, "c.jpg", None, Some(c)).await;
        mk_image(&pool, "bolts.jpg", Some(i1), None).await;

        let original = hierarchy::get_folder(&pool, a).await.unwrap();
        let clone = hierarchy::clone_folder(
            &pool,
            a,
            &CloneFolderRequest::default(),
            " (Cloned)",
        )
        .await
        .unwrap();

        // Only the top node is renamed; the rest is preserved verbatim
        assert_eq!(clone.name, "A (Cloned)");
        assert_eq!(clone.subfolders[0].name, "B");
        assert_eq!(clone.subfolders[0].subfolders[0].name, "C");
        assert_eq!(clone.parent_id, None);

        // Same shape, same counts
        assert_eq!(count_nodes(&original), count_nodes(&clone));

        // Every id is fresh
        let mut original_ids = Vec::new();
        let mut clone_ids = Vec::new();
        collect_ids(&original, &mut original_ids);
        collect_ids(&clone, &mut clone_ids);
        assert!(clone_ids.iter().all(|id| !original_ids.contains(id)));

        // Cloned images point at the clone, never the original
        assert_eq!(clone.images.len(), 1);
        assert_eq!(clone.images[0].folder_id, Some(clone.id));
        assert_eq!(clone.items[0].images.len(), 1);
        assert_eq!(clone.items[0].images[0].item_id, Some(clone.items[0].id));
        assert_eq!(clone.items[0].quantity, 7.5);
        assert_eq!(clone.items[0].name, "bolts");

        // Original untouched
        let after = hierarchy::get_folder(&pool, a).await.unwrap();
        assert_eq!(count_nodes(&after), count_nodes(&original));
    }

    #[tokio::test]
    async fn test_clone_folder_into_target_parent() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let target = mk_folder(&pool, "Target", None).await;
        let sub = mk_folder(&pool, "sub", Some(a)).await;

        let clone = hierarchy::clone_folder(
            &pool,
            sub,
            &CloneFolderRequest { new_parent_id: Some(target), to_root: false },
            " (Cloned)",
        )
        .await
        .unwrap();
        assert_eq!(clone.parent_id, Some(target));

        // Without a target the clone lands next to the source
        let sibling = hierarchy::clone_folder(
            &pool,
            sub,
            &CloneFolderRequest::default(),
            " (Cloned)",
        )
        .await
        .unwrap();
        assert_eq!(sibling.parent_id, Some(a));

        // Explicit root placement
        let rooted = hierarchy::clone_folder(
            &pool,
            sub,
            &CloneFolderRequest { new_parent_id: None, to_root: true },
            " (Cloned)",
        )
        .await
        .unwrap();
        assert_eq!(rooted.parent_id, None);
    }

    #[tokio::test]
    async fn test_clone_folder_missing_source_or_target() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;

        let err = hierarchy::clone_folder(&pool, 999, &CloneFolderRequest::default(), " (Cloned)")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = hierarchy::clone_folder(
            &pool,
            a,
            &CloneFolderRequest { new_parent_id: Some(999), to_root: false },
            " (Cloned)",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_quantity_scenario() {
        let pool = setup_test_db().await;
        let a = mk_folder(&pool, "A", None).await;
        let b = mk_folder(&pool, "B", Some(a)).await;
        mk_item(&pool, "I1", Some(a), 3.5).await;
        mk_item(&pool, "I2", Some(b), 2.0).await;

        assert_eq!(hierarchy::aggregate::total_quantity(&pool, Some(a)).await.unwrap(), 5.5);

        hierarchy::delete_folder(&pool, b).await.unwrap();
        assert_eq!(hierarchy::aggregate::total_quantity(&pool, Some(a)).await.unwrap(), 3.5);
        assert!(matches!(
            hierarchy::get_folder(&pool, b).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        // Re-create B with I2, then clone A to root
        let b2 = mk_folder(&pool, "B", Some(a)).await;
        mk_item(&pool, "I2", Some(b2), 2.0).await;
        let clone = hierarchy::clone_folder(
            &pool,
            a,
            &CloneFolderRequest { new_parent_id: None, to_root: true },
            " (Cloned)",
        )
        .await
        .unwrap();

        assert_ne!(clone.id, a);
        assert_eq!(clone.items.len(), 1);
        assert_eq!(clone.items[0].name, "I1");
        assert_eq!(clone.items[0].quantity, 3.5);
        assert_eq!(clone.subfolders.len(), 1);
        assert_eq!(clone.subfolders[0].name, "B");
        assert_eq!(clone.subfolders[0].items[0].quantity, 2.0);
        assert_eq!(
            hierarchy::aggregate::total_quantity(&pool, Some(clone.id)).await.unwrap(),
            5.5
        );
    }
}
