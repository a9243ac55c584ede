use mediator::{BoxError, Request, RequestHandler};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct Product {
    pub name: String,
    pub price: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("product `{0}` already exists")]
    AlreadyExists(String),
}

pub type SharedProductService = Arc<Mutex<Vec<Product>>>;

pub struct AddProductRequest {
    name: String,
    price: f32,
}

impl AddProductRequest {
    pub fn new(name: &str, price: f32) -> Self {
        AddProductRequest {
            name: name.to_owned(),
            price,
        }
    }
}

impl Request for AddProductRequest {
    const KIND: &'static str = "AddProductRequest";
    type Response = Product;
}

pub struct AddProductHandler(pub SharedProductService);

#[mediator::async_trait]
impl RequestHandler<AddProductRequest> for AddProductHandler {
    async fn handle(&self, req: &AddProductRequest) -> Result<Product, BoxError> {
        if req.name.trim().is_empty() {
            return Err(ProductError::EmptyName.into());
        }

        let mut products = self.0.lock().unwrap();
        if products.iter().any(|p| p.name == req.name) {
            return Err(ProductError::AlreadyExists(req.name.clone()).into());
        }

        let product = Product {
            name: req.name.clone(),
            price: req.price,
        };
        products.push(product.clone());
        Ok(product)
    }
}

pub struct GetAllProductsRequest;

impl Request for GetAllProductsRequest {
    const KIND: &'static str = "GetAllProductsRequest";
    type Response = Vec<Product>;
}

pub struct GetAllProductsHandler(pub SharedProductService);

#[mediator::async_trait]
impl RequestHandler<GetAllProductsRequest> for GetAllProductsHandler {
    async fn handle(&self, _: &GetAllProductsRequest) -> Result<Vec<Product>, BoxError> {
        Ok(self.0.lock().unwrap().clone())
    }
}
