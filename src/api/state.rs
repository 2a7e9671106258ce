//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::path::PathBuf;
use std::sync::Arc;

use tera::Tera;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    BrandService, CategoryService, ProductImageService, ProductService, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub brand_service: Arc<dyn BrandService>,
    pub category_service: Arc<dyn CategoryService>,
    pub product_service: Arc<dyn ProductService>,
    pub user_service: Arc<dyn UserService>,
    pub image_service: Arc<dyn ProductImageService>,
    /// Compiled view templates
    pub templates: Arc<Tera>,
    /// Directory served under `/product-images`
    pub upload_dir: PathBuf,
    /// Database connection, absent when the services are not database backed
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state wired to the database.
    pub fn from_config(database: Arc<Database>, templates: Arc<Tera>, config: &Config) -> Self {
        let services = Services::from_connection(database.get_connection(), config);

        let mut state = Self::new(services, templates, PathBuf::from(&config.upload_dir));
        state.database = Some(database);
        state
    }

    /// Create application state with manually injected services.
    pub fn new(services: Services, templates: Arc<Tera>, upload_dir: PathBuf) -> Self {
        Self {
            brand_service: services.brands,
            category_service: services.categories,
            product_service: services.products,
            user_service: services.users,
            image_service: services.images,
            templates,
            upload_dir,
            database: None,
        }
    }
}
