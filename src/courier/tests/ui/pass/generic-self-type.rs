use std::marker::PhantomData;

use courier::argument::Argument;
use courier::prelude::*;

pub struct Wrapper<T> {
    pub inner: T,
}

#[deliverable]
impl<T> Wrapper<T>
where
    T: Argument + Clone,
{
    #[constructor]
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

pub struct Tagged<T: Send + Sync + 'static> {
    pub label: &'static str,
    _marker: PhantomData<fn() -> T>,
}

#[deliverable]
impl<T: Send + Sync + 'static> Tagged<T> {
    #[constructor]
    pub fn new(label: &'static str) -> Result<Tagged<T>, String> {
        Ok(Self {
            label,
            _marker: PhantomData,
        })
    }
}

fn main() {
    let _ = RegularDelivery::<Wrapper<u32>>::new(args![7u32]);
    let _ = RegularDelivery::<Tagged<String>>::new(args!["label"]);
}
