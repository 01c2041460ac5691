struct Endpoint;

#[courier::deliverable]
impl Endpoint {
    #[constructor]
    fn new() -> Option<Self> {
        Some(Self)
    }
}

fn main() {
    let _ = Endpoint;
}
