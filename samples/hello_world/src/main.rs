use mediator::{BoxError, DefaultMediator, Mediator, Request, RequestHandler};

struct HelloRequest(Option<&'static str>);

impl Request for HelloRequest {
    const KIND: &'static str = "HelloRequest";
    type Response = String;
}

struct HelloRequestHandler;

#[mediator::async_trait]
impl RequestHandler<HelloRequest> for HelloRequestHandler {
    async fn handle(&self, req: &HelloRequest) -> Result<String, BoxError> {
        match req.0 {
            Some(name) => Ok(format!("Hello {}", name)),
            None => Ok("Hello World!".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("trace"));

    mediator::handle!(HelloRequest => HelloRequestHandler);
    let mediator = DefaultMediator::global();

    if let Some(response) = mediator.send(HelloRequest(Some("Tom"))).await? {
        println!("{}", response);
    }

    if let Some(response) = mediator.send(HelloRequest(None)).await? {
        println!("{}", response);
    }

    Ok(())
}
