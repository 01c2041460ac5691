use std::error::Error;
use std::sync::Arc;

use courier::prelude::*;

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let container = Container::init(AppModule::new("greeter"))?;
    let app = container
        .member("App")?
        .and_then(Member::typed::<App>)
        .ok_or("App should be bound")?;

    app.create(args![])?.run()?;
    Ok(())
}

struct AppModule {
    app_name: &'static str,
}

impl AppModule {
    fn new(app_name: &'static str) -> Self {
        Self { app_name }
    }
}

impl Module for AppModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        bind("app_name").to_value(self.app_name).set_on(configurer);

        bind("Logger")
            .to_cached::<ConsoleLogger, _>(Lifetime::Unbounded)
            .prepared(args![self.app_name])
            .set_on(configurer);

        bind("EnglishGreeter")
            .to_regular::<Greeter>()
            .prepared(args!["Hello World!"])
            .set_on(configurer);

        bind("ChineseGreeter")
            .to_regular::<Greeter>()
            .prepared(args!["你好世界!"])
            .set_on(configurer);

        bind("App").to_cached::<App, _>("1h").set_on(configurer);

        Ok(())
    }
}

struct ConsoleLogger {
    app_name: &'static str,
}

#[deliverable]
impl ConsoleLogger {
    #[constructor]
    fn new(app_name: &'static str) -> Self {
        Self { app_name }
    }

    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

struct Greeter {
    logger: Arc<ConsoleLogger>,
    message: &'static str,
}

#[deliverable]
impl Greeter {
    #[constructor]
    fn new(
        #[container] container: Container,
        message: &'static str,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let logger = container
            .member("Logger")?
            .and_then(Member::typed::<ConsoleLogger>)
            .ok_or("Logger should be bound")?
            .create(args![])?;
        Ok(Self { logger, message })
    }

    fn greet(&self) {
        self.logger.log(self.message);
    }
}

struct App {
    container: Container,
}

#[deliverable]
impl App {
    #[constructor]
    fn new(#[container] container: Container) -> Self {
        Self { container }
    }

    fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let name = self
            .container
            .value("app_name")
            .and_then(|value| value.downcast_ref::<&'static str>().copied())
            .unwrap_or("unnamed");
        eprintln!("Greeting from {name}:");

        for greeter in ["EnglishGreeter", "ChineseGreeter"] {
            let member = self.container.member(greeter)?.ok_or("greeter should be bound")?;
            let instance = member.create(args![])?;
            if let Some(greeter) = instance.downcast_ref::<Greeter>() {
                greeter.greet();
            }
        }
        Ok(())
    }
}
