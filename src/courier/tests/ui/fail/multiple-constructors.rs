struct Endpoint;

#[courier::deliverable]
impl Endpoint {
    #[constructor]
    fn new() -> Self {
        Self
    }

    #[constructor]
    fn with_port(port: u16) -> Self {
        Self
    }
}

fn main() {
    let _ = Endpoint;
}
