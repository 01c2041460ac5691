struct Endpoint;

#[courier::deliverable]
impl Endpoint {
    fn new() -> Self {
        Self
    }
}

fn main() {
    let _ = Endpoint;
}
