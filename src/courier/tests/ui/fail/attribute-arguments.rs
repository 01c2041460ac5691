struct Endpoint;

#[courier::deliverable(cached)]
impl Endpoint {
    #[constructor]
    fn new() -> Self {
        Self
    }
}

fn main() {
    let _ = Endpoint;
}
