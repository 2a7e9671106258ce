//! Product service - Product catalogue use cases.

use async_trait::async_trait;
use std::sync::Arc;

use super::keyword_filter;
use crate::domain::Product;
use crate::errors::{AppResult, OptionExt};
use crate::infra::ProductRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductService: Send + Sync {
    /// All products, or those whose name contains `keyword` when it is non-empty
    async fn list_all(&self, keyword: Option<String>) -> AppResult<Vec<Product>>;

    /// `true` when no product is stored under the candidate's name.
    /// The candidate's own row counts as a clash.
    async fn check_unique(&self, product: &Product) -> AppResult<bool>;

    /// Product by id, `NotFound` when absent
    async fn get(&self, id: i64) -> AppResult<Product>;

    async fn save(&self, product: Product) -> AppResult<Product>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of ProductService.
pub struct ProductManager {
    repo: Arc<dyn ProductRepository>,
}

impl ProductManager {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ProductService for ProductManager {
    async fn list_all(&self, keyword: Option<String>) -> AppResult<Vec<Product>> {
        match keyword_filter(keyword.as_deref()) {
            Some(keyword) => self.repo.search(keyword).await,
            None => self.repo.find_all().await,
        }
    }

    async fn check_unique(&self, product: &Product) -> AppResult<bool> {
        Ok(self.repo.find_by_name(&product.name).await?.is_none())
    }

    async fn get(&self, id: i64) -> AppResult<Product> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_not_found(format!("Product {} not found", id))
    }

    async fn save(&self, product: Product) -> AppResult<Product> {
        self.repo.save(product).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Brand, Category};
    use crate::errors::AppError;
    use crate::infra::MockProductRepository;
    use mockall::predicate::eq;

    fn create_test_product(id: Option<i64>, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: "description".to_string(),
            stock: 1,
            image: Some("image.png".to_string()),
            price: 1.0,
            purchase_price: 1.0,
            shipping_cost: 1.0,
            tax_rate: 1.0,
            category: Some(Category::new(1, "categoryA")),
            brand: Some(Brand::new(1, "brandA")),
        }
    }

    #[tokio::test]
    async fn test_list_all_without_keyword() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_all().times(1).returning(|| {
            Ok(vec![
                create_test_product(Some(1), "productA"),
                create_test_product(Some(2), "productB"),
            ])
        });

        let products = ProductManager::new(Arc::new(repo))
            .list_all(None)
            .await
            .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, Some(1));
        assert_eq!(products[1].id, Some(2));
    }

    #[tokio::test]
    async fn test_list_all_with_keyword() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_all().never();
        repo.expect_search()
            .withf(|keyword| keyword == "productB")
            .returning(|_| Ok(vec![create_test_product(Some(2), "productB")]));

        let products = ProductManager::new(Arc::new(repo))
            .list_all(Some("productB".into()))
            .await
            .unwrap();

        assert_eq!(products, vec![create_test_product(Some(2), "productB")]);
    }

    #[tokio::test]
    async fn test_check_unique_true_when_lookup_finds_nothing() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_name()
            .withf(|name| name == "product")
            .returning(|_| Ok(None));

        let product = Product {
            name: "product".to_string(),
            ..Default::default()
        };
        let unique = ProductManager::new(Arc::new(repo))
            .check_unique(&product)
            .await
            .unwrap();

        assert!(unique);
    }

    #[tokio::test]
    async fn test_check_unique_false_when_lookup_finds_row() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_name()
            .returning(|_| Ok(Some(create_test_product(Some(1), "product"))));

        let product = Product {
            name: "product".to_string(),
            ..Default::default()
        };
        let unique = ProductManager::new(Arc::new(repo))
            .check_unique(&product)
            .await
            .unwrap();

        assert!(!unique);
    }

    #[tokio::test]
    async fn test_get_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(create_test_product(Some(id), "productA"))));

        let product = ProductManager::new(Arc::new(repo)).get(1).await.unwrap();

        assert_eq!(product.name, "productA");
        assert_eq!(product.brand, Some(Brand::new(1, "brandA")));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id().with(eq(1000)).returning(|_| Ok(None));

        let result = ProductManager::new(Arc::new(repo)).get(1000).await;

        match result {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Product 1000 not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_and_delete_delegate() {
        let mut repo = MockProductRepository::new();
        repo.expect_save()
            .times(1)
            .returning(|mut product| {
                product.id = Some(5);
                Ok(product)
            });
        repo.expect_delete().with(eq(5)).times(1).returning(|_| Ok(()));
        let service = ProductManager::new(Arc::new(repo));

        let saved = service
            .save(create_test_product(None, "productE"))
            .await
            .unwrap();
        assert_eq!(saved.id, Some(5));

        service.delete(5).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_conflict_propagates() {
        let mut repo = MockProductRepository::new();
        repo.expect_save()
            .returning(|_| Err(AppError::conflict("Product")));

        let result = ProductManager::new(Arc::new(repo))
            .save(create_test_product(None, "productA"))
            .await;

        assert!(result.unwrap_err().is_conflict());
    }
}
