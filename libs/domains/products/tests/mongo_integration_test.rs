//! Repository tests against a real MongoDB.
//!
//! Run with `cargo test -p domain_products -- --ignored` (needs Docker).

use domain_products::{
    MongoProductRepository, NewProduct, ProductError, ProductId, ProductRepository, QueryBuilder,
    UpdateProduct,
};
use test_utils::{assertions::assert_close, TestDataBuilder, TestMongo};

fn new_product(builder: &TestDataBuilder, title: &str, price: f64) -> NewProduct {
    NewProduct {
        title: title.to_string(),
        description: Some(format!("{title} (deluxe)")),
        price,
        category: "kitchen".to_string(),
        owner: builder.user_id().to_hex(),
        stock: 2,
        published: true,
        images: vec![],
    }
}

async fn repository(mongo: &TestMongo, builder: &TestDataBuilder) -> MongoProductRepository {
    let repo = MongoProductRepository::new(&mongo.database(&builder.name("products", "db")));
    repo.init_indexes().await.unwrap();
    repo
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_find_update_delete() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_insert_find_update_delete");
    let repo = repository(&mongo, &builder).await;

    let created = repo
        .insert(new_product(&builder, "Kettle", 39.5))
        .await
        .unwrap();
    let id = created.product_id();

    let found = repo.find_by_id(id).await.unwrap();
    assert_eq!(found, created);

    let updated = repo
        .update_by_id(
            id,
            UpdateProduct {
                stock: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.stock, 9);
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.created_at, created.created_at);

    repo.delete_by_id(id).await.unwrap();
    assert!(matches!(
        repo.find_by_id(id).await,
        Err(ProductError::NotFound(_))
    ));
    assert!(matches!(
        repo.delete_by_id(id).await,
        Err(ProductError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_missing_is_not_found() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_update_missing_is_not_found");
    let repo = repository(&mongo, &builder).await;

    let result = repo
        .update_by_id(
            ProductId::from(builder.object_id(99)),
            UpdateProduct {
                title: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ProductError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_search_escapes_regex_metacharacters() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_search_escapes_regex_metacharacters");
    let repo = repository(&mongo, &builder).await;

    repo.insert(new_product(&builder, "Kettle", 10.0)).await.unwrap();
    repo.insert(new_product(&builder, "Toaster", 20.0)).await.unwrap();

    let query = QueryBuilder::new().search(Some("(DELUXE)")).build();
    assert_eq!(repo.find_by_filter(&query).await.unwrap().len(), 2);

    let query = QueryBuilder::new().search(Some(".*")).build();
    assert!(repo.find_by_filter(&query).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_filter_sort_and_page() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_filter_sort_and_page");
    let repo = repository(&mongo, &builder).await;

    for price in [5.0, 10.0, 15.0, 20.0, 25.0] {
        repo.insert(new_product(&builder, "Item", price)).await.unwrap();
    }

    let query = QueryBuilder::new()
        .price_range(Some("10"), Some("20"))
        .unwrap()
        .sort(Some("price"), Some("desc"))
        .unwrap()
        .paginate(Some("1"), Some("2"))
        .build();
    let prices: Vec<f64> = repo
        .find_by_filter(&query)
        .await
        .unwrap()
        .iter()
        .map(|p| p.price)
        .collect();
    assert_eq!(prices, vec![20.0, 15.0]);

    let query = QueryBuilder::new().filter("stock", "2").unwrap().build();
    assert_eq!(repo.find_by_filter(&query).await.unwrap().len(), 5);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_aggregate_stats() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_aggregate_stats");
    let repo = repository(&mongo, &builder).await;

    let empty = repo.aggregate_stats().await.unwrap();
    assert_eq!(empty.count, 0);
    assert_close(empty.avg_price, 0.0, "empty collection");

    for price in [10.0, 20.0, 30.0] {
        repo.insert(new_product(&builder, "Item", price)).await.unwrap();
    }
    let stats = repo.aggregate_stats().await.unwrap();
    assert_eq!(stats.count, 3);
    assert_close(stats.avg_price, 20.0, "mean of 10, 20, 30");
}
