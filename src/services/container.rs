//! Service Container - Wires every service to its SeaORM store.

use std::sync::Arc;

use super::{
    BrandManager, BrandService, CategoryManager, CategoryService, ImageStore, ProductImageService,
    ProductManager, ProductService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{BrandStore, CategoryStore, ProductStore, RoleStore, UserStore};

/// All application services behind their traits.
#[derive(Clone)]
pub struct Services {
    pub brands: Arc<dyn BrandService>,
    pub categories: Arc<dyn CategoryService>,
    pub products: Arc<dyn ProductService>,
    pub users: Arc<dyn UserService>,
    pub images: Arc<dyn ProductImageService>,
}

impl Services {
    /// Create a service container from already built services
    pub fn new(
        brands: Arc<dyn BrandService>,
        categories: Arc<dyn CategoryService>,
        products: Arc<dyn ProductService>,
        users: Arc<dyn UserService>,
        images: Arc<dyn ProductImageService>,
    ) -> Self {
        Self {
            brands,
            categories,
            products,
            users,
            images,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> Self {
        let brands = Arc::new(BrandManager::new(Arc::new(BrandStore::new(db.clone()))));
        let categories = Arc::new(CategoryManager::new(Arc::new(CategoryStore::new(db.clone()))));
        let products = Arc::new(ProductManager::new(Arc::new(ProductStore::new(db.clone()))));
        let users = Arc::new(UserManager::new(
            Arc::new(UserStore::new(db.clone())),
            Arc::new(RoleStore::new(db)),
        ));
        let images = Arc::new(ImageStore::from_config(config));

        Self::new(brands, categories, products, users, images)
    }
}
