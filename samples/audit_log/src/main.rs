mod products;

use crate::products::{
    AddProductHandler, AddProductRequest, GetAllProductsHandler, GetAllProductsRequest, Product,
    SharedProductService,
};
use mediator::{BoxError, DefaultMediator, Mediator, RequestRef, ResponseRef};
use std::sync::{Arc, Mutex};

struct AuditEntry {
    kind: String,
    succeeded: bool,
}

type AuditTrail = Arc<Mutex<Vec<AuditEntry>>>;

fn create_mediator(service: &SharedProductService, trail: &AuditTrail) -> DefaultMediator {
    let mediator = DefaultMediator::new();

    mediator::handle! {
        in mediator;
        AddProductRequest => AddProductHandler(service.clone()),
        GetAllProductsRequest => GetAllProductsHandler(service.clone()),
    }

    mediator.before_each_fn(|req: RequestRef<'_>| {
        log::info!("-> {}", req.kind());
        async { Ok::<(), BoxError>(()) }
    });

    let trail = trail.clone();
    mediator.after_each_fn(move |req: RequestRef<'_>, res: ResponseRef<'_>| {
        log::info!("<- {} ({})", req.kind(), if res.is_present() { "ok" } else { "failed" });
        trail.lock().unwrap().push(AuditEntry {
            kind: req.kind().to_owned(),
            succeeded: res.is_present(),
        });
        async { Ok::<(), BoxError>(()) }
    });

    mediator
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let service = SharedProductService::default();
    let trail = AuditTrail::default();
    let mediator = create_mediator(&service, &trail);

    mediator.send(AddProductRequest::new("Microwave", 120.0)).await?;
    mediator.send(AddProductRequest::new("Toaster", 35.5)).await?;

    if let Err(err) = mediator.send(AddProductRequest::new("", 10.0)).await {
        log::warn!("{}", err);
    }

    let products: Vec<Product> = mediator
        .send(GetAllProductsRequest)
        .await?
        .unwrap_or_default();
    for product in &products {
        println!("{} ${:.2}", product.name, product.price);
    }

    for entry in trail.lock().unwrap().iter() {
        let outcome = if entry.succeeded { "ok" } else { "failed" };
        println!("audit: {} {}", entry.kind, outcome);
    }

    Ok(())
}
