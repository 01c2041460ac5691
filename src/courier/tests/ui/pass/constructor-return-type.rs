use std::convert::Infallible;

use courier::prelude::*;

pub struct Test1;

#[deliverable]
impl Test1 {
    #[constructor]
    pub fn new() -> Self {
        todo!()
    }
}

pub struct Test2;

#[deliverable]
impl Test2 {
    #[constructor]
    pub fn new() -> Test2 {
        todo!()
    }
}

pub struct Test3;

#[deliverable]
impl Test3 {
    #[constructor]
    pub fn new() -> Result<Self, Infallible> {
        todo!()
    }
}

pub struct Test4;

#[deliverable]
impl Test4 {
    #[constructor]
    pub fn new() -> Result<Test4, Infallible> {
        todo!()
    }
}

pub struct Test5;

#[deliverable]
impl Test5 {
    #[constructor]
    pub fn new() -> std::result::Result<Test5, Box<dyn std::error::Error + Send + Sync>> {
        todo!()
    }
}

fn main() {}
