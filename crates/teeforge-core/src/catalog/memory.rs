//! In-memory catalog collaborators for tests and embedding.

use super::{
    BoxFuture, CatalogError, CatalogResult, NewProduct, ObjectUpload, ProductStore, SellerAuth,
};
use crate::product::Product;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

fn lock_error(e: impl std::fmt::Display) -> CatalogError {
    CatalogError::Store(format!("Lock error: {}", e))
}

/// Fixed set of seller ids.
#[derive(Debug, Default)]
pub struct StaticSellerAuth {
    sellers: HashSet<String>,
}

impl StaticSellerAuth {
    pub fn new<I, S>(sellers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sellers: sellers.into_iter().map(Into::into).collect(),
        }
    }
}

impl SellerAuth for StaticSellerAuth {
    fn is_seller(&self, user_id: &str) -> BoxFuture<'_, CatalogResult<bool>> {
        let allowed = self.sellers.contains(user_id);
        Box::pin(async move { Ok(allowed) })
    }
}

/// Object store keeping uploads in memory under `memory://` URLs.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `url`.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.objects.read().ok()?.get(url).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().map(|o| o.is_empty()).unwrap_or(true)
    }
}

impl ObjectUpload for MemoryObjectStore {
    fn upload(&self, bytes: Vec<u8>, file_name: &str) -> BoxFuture<'_, CatalogResult<String>> {
        let url = format!("memory://{}/{}", Uuid::new_v4(), file_name);
        Box::pin(async move {
            let mut objects = self.objects.write().map_err(lock_error)?;
            objects.insert(url.clone(), bytes);
            Ok(url)
        })
    }
}

/// Product store backed by a vector, preserving creation order.
#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductStore for MemoryProductStore {
    fn create(&self, product: NewProduct) -> BoxFuture<'_, CatalogResult<Product>> {
        Box::pin(async move {
            let product = product.into_product(Uuid::new_v4().simple().to_string());
            let mut products = self.products.write().map_err(lock_error)?;
            products.push(product.clone());
            Ok(product)
        })
    }

    fn find_all(&self) -> BoxFuture<'_, CatalogResult<Vec<Product>>> {
        Box::pin(async move {
            let products = self.products.read().map_err(lock_error)?;
            Ok(products.clone())
        })
    }

    fn find(&self, id: &str) -> BoxFuture<'_, CatalogResult<Product>> {
        let id = id.to_string();
        Box::pin(async move {
            let products = self.products.read().map_err(lock_error)?;
            products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or(CatalogError::NotFound(id))
        })
    }
}
