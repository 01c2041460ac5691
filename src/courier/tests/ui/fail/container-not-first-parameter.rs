struct Endpoint;

#[courier::deliverable]
impl Endpoint {
    #[constructor]
    fn new(port: u16, #[container] container: courier::container::Container) -> Self {
        Self
    }
}

fn main() {
    let _ = Endpoint;
}
