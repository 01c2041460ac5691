struct Endpoint;

#[courier::deliverable]
impl Default for Endpoint {
    #[constructor]
    fn default() -> Self {
        Self
    }
}

fn main() {
    let _ = Endpoint;
}
