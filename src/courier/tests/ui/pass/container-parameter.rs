use courier::prelude::*;

pub struct Standalone {
    pub name: String,
}

#[deliverable]
impl Standalone {
    #[constructor]
    pub fn new(name: String) -> Self {
        Self { name }
    }
}

pub struct Located {
    pub container: Container,
    pub port: u16,
}

#[deliverable]
impl Located {
    #[constructor]
    pub fn new(#[container] container: Container, port: u16) -> Self {
        Self { container, port }
    }
}

pub struct OnlyContainer {
    pub container: Container,
}

#[deliverable]
impl OnlyContainer {
    #[constructor]
    fn create(#[container] container: Container) -> Result<Self, String> {
        Ok(Self { container })
    }

    pub fn helper(&self) -> &Container {
        &self.container
    }
}

const _: () = {
    assert!(matches!(
        <Standalone as Deliverable>::LOCATION,
        DeliveryLocation::Standalone
    ));
    assert!(matches!(
        <Located as Deliverable>::LOCATION,
        DeliveryLocation::NeedsContainer
    ));
    assert!(matches!(
        <OnlyContainer as Deliverable>::LOCATION,
        DeliveryLocation::NeedsContainer
    ));
};

fn main() {}
