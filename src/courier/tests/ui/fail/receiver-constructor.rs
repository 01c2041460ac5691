struct Endpoint;

#[courier::deliverable]
impl Endpoint {
    #[constructor]
    fn new(&self) -> Self {
        Self
    }
}

fn main() {
    let _ = Endpoint;
}
