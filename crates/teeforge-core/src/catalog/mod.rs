//! Catalog collaborators: seller auth, object upload and the product store.

mod memory;

pub use memory::{MemoryObjectStore, MemoryProductStore, StaticSellerAuth};

use crate::color::GarmentColor;
use crate::overlay::UploadedFile;
use crate::product::{DesignTemplates, Product};
use crate::view::{ViewKey, ViewMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Catalog errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("not authorized")]
    NotAuthorized,
    #[error("no files uploaded")]
    NoFiles,
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Decides whether a user may manage products.
pub trait SellerAuth: Send + Sync {
    fn is_seller(&self, user_id: &str) -> BoxFuture<'_, CatalogResult<bool>>;
}

/// Object storage for product images and templates. Returns a public URL.
pub trait ObjectUpload: Send + Sync {
    fn upload(&self, bytes: Vec<u8>, file_name: &str) -> BoxFuture<'_, CatalogResult<String>>;
}

/// Product persistence.
pub trait ProductStore: Send + Sync {
    /// Persist a new product, assigning its id.
    fn create(&self, product: NewProduct) -> BoxFuture<'_, CatalogResult<Product>>;

    /// All products, oldest first.
    fn find_all(&self) -> BoxFuture<'_, CatalogResult<Vec<Product>>>;

    fn find(&self, id: &str) -> BoxFuture<'_, CatalogResult<Product>>;
}

/// A product record before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub offer_price: f64,
    pub images: Vec<String>,
    pub date: u64,
    pub design_templates: DesignTemplates,
    pub available_colors: Vec<GarmentColor>,
}

impl NewProduct {
    pub fn into_product(self, id: String) -> Product {
        Product {
            id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            category: self.category,
            price: self.price,
            offer_price: self.offer_price,
            images: self.images,
            date: self.date,
            design_templates: self.design_templates,
            available_colors: self.available_colors,
        }
    }
}

/// Seller's add-product submission.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Raw form value; parsed as a number.
    pub price: String,
    pub offer_price: String,
    pub images: Vec<UploadedFile>,
    pub templates: ViewMap<UploadedFile>,
    pub colors: Vec<GarmentColor>,
}

/// Parse a form number. Blank counts as zero.
fn parse_price(raw: &str) -> CatalogResult<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CatalogError::InvalidPrice(raw.to_string()))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Seller catalog operations over pluggable collaborators.
#[derive(Clone)]
pub struct Catalog {
    auth: Arc<dyn SellerAuth>,
    uploads: Arc<dyn ObjectUpload>,
    products: Arc<dyn ProductStore>,
}

impl Catalog {
    pub fn new(
        auth: Arc<dyn SellerAuth>,
        uploads: Arc<dyn ObjectUpload>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            auth,
            uploads,
            products,
        }
    }

    /// Create a product from a seller's form.
    ///
    /// Images are uploaded in order. Each template view with a non-empty file
    /// is uploaded and recorded; views without one are left unavailable.
    pub async fn add_product(&self, caller: &str, form: ProductForm) -> CatalogResult<Product> {
        if !self.auth.is_seller(caller).await? {
            log::warn!("Rejected add-product from non-seller {}", caller);
            return Err(CatalogError::NotAuthorized);
        }
        if form.images.is_empty() {
            return Err(CatalogError::NoFiles);
        }
        let price = parse_price(&form.price)?;
        let offer_price = parse_price(&form.offer_price)?;

        let mut images = Vec::with_capacity(form.images.len());
        for file in form.images {
            images.push(self.uploads.upload(file.bytes, &file.name).await?);
        }

        let mut design_templates = DesignTemplates::default();
        for view in ViewKey::ALL {
            let Some(file) = form.templates.get(view) else {
                continue;
            };
            if file.bytes.is_empty() {
                log::debug!("Skipping empty {} template", view);
                continue;
            }
            let url = self.uploads.upload(file.bytes.clone(), &file.name).await?;
            design_templates.set(view, url);
        }

        let product = self
            .products
            .create(NewProduct {
                user_id: caller.to_string(),
                name: form.name,
                description: form.description,
                category: form.category,
                price,
                offer_price,
                images,
                date: now_millis(),
                design_templates,
                available_colors: form.colors,
            })
            .await?;
        log::info!(
            "Seller {} added product {} ({} views)",
            caller,
            product.id,
            product.available_views().len()
        );
        Ok(product)
    }

    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        self.products.find_all().await
    }

    pub async fn product(&self, id: &str) -> CatalogResult<Product> {
        self.products.find(id).await
    }
}
