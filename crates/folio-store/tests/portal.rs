//! Portal ingestion against a temporary content tree

use folio_content::Lang;
use folio_schema::Vertical;
use folio_store::{ContentStore, EngineConfig, ErrorCategory, PortalIngest, PortalPost, PortalPostUpdate};
use folio_test_utils::{test_assets, ContentTree};
use pretty_assertions::assert_eq;

fn store(tree: &ContentTree) -> ContentStore {
    ContentStore::new(
        EngineConfig::new()
            .with_content_dir(tree.root())
            .with_assets(test_assets()),
    )
    .unwrap()
}

fn post(id: &str, category: u8) -> PortalPost {
    PortalPost {
        id: id.to_string(),
        title: "Admissions open".to_string(),
        publish_date: Some("15/08/2024 09:00:00".to_string()),
        thumb: "thumbs/admission.jpg".to_string(),
        content: "Apply now.".to_string(),
        description: "Short summary".to_string(),
        sdgs: vec![4],
        category,
    }
}

#[tokio::test]
async fn create_places_post_by_category() {
    let tree = ContentTree::new();
    let store = store(&tree);
    let ingest = PortalIngest::new(&store);

    let target = ingest.create_post(Lang::En, post("admission-2024", 3)).await.unwrap();
    assert_eq!(target.full_path, tree.path("open_admission/admission-2024.md"));

    let doc = store
        .read_document(&target, store.schema(Vertical::News))
        .await
        .unwrap();
    assert_eq!(doc.metadata["author"], "UEH Portal");
    assert_eq!(doc.metadata["location"], "");
    assert_eq!(doc.metadata["publishDate"], "2024-08-15T09:00:00.000Z");
    assert_eq!(
        doc.metadata["image"],
        "http://localhost:4000/uploads/static/thumbs/admission.jpg"
    );
    assert_eq!(doc.content, "<p>Apply now.</p>\n");
}

#[tokio::test]
async fn create_twice_conflicts() {
    let tree = ContentTree::new();
    let store = store(&tree);
    let ingest = PortalIngest::new(&store);
    ingest.create_post(Lang::En, post("dup", 0)).await.unwrap();
    let err = ingest.create_post(Lang::En, post("dup", 0)).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn unknown_category_rejected() {
    let tree = ContentTree::new();
    let store = store(&tree);
    let err = PortalIngest::new(&store)
        .create_post(Lang::En, post("x", 9))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Invalid);
    assert!(err.to_string().contains("Unknown category"));
}

#[tokio::test]
async fn update_merges_over_current_post() {
    let tree = ContentTree::new();
    let store = store(&tree);
    let ingest = PortalIngest::new(&store);
    ingest.create_post(Lang::En, post("p", 1)).await.unwrap();

    let target = ingest
        .update_post(
            Lang::En,
            PortalPostUpdate {
                id: "p".into(),
                category: 1,
                thumb: Some("new.jpg".into()),
                ..PortalPostUpdate::default()
            },
        )
        .await
        .unwrap();

    let doc = store
        .read_document(&target, store.schema(Vertical::News))
        .await
        .unwrap();
    assert_eq!(doc.metadata["title"], "Admissions open");
    assert_eq!(
        doc.metadata["image"],
        "http://localhost:4000/uploads/static/images/new.jpg"
    );
    assert_eq!(doc.content, "<p>Apply now.</p>\n");
}

#[tokio::test]
async fn update_of_missing_post_is_not_found() {
    let tree = ContentTree::new();
    let store = store(&tree);
    let err = PortalIngest::new(&store)
        .update_post(
            Lang::Vi,
            PortalPostUpdate {
                id: "missing".into(),
                category: 2,
                title: Some("T".into()),
                ..PortalPostUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}
