// note: this example assumes you've analyzed the previous one

use autowire::application::Application;
use autowire::config::ApplicationConfig;
use autowire::runner::ApplicationRunner;
use autowire_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
use autowire_di::Component;

// the application config is registered in the container, so it can be injected like any other
// component
#[derive(Component)]
struct ConfigPrinterRunner {
    config: ComponentInstancePtr<ApplicationConfig>,
}

impl ApplicationRunner for ConfigPrinterRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("Using built-in logger: {}", self.config.install_tracing_logger);
        Ok(())
    }

    // for ordered execution of application runners, priorities can be used
    fn priority(&self) -> i8 {
        1
    }
}

#[derive(Component)]
struct GoodbyeRunner;

impl ApplicationRunner for GoodbyeRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("Goodbye!");
        Ok(())
    }

    fn priority(&self) -> i8 {
        -1
    }
}

fn main() {
    // start with a default config and override what's needed, instead of reading it from the
    // environment
    let mut config = ApplicationConfig::default();
    config.install_tracing_logger = false;

    let application = Application::builder()
        .with_config(config)
        .with_runner::<GoodbyeRunner>()
        .with_runner::<ConfigPrinterRunner>()
        .build()
        .expect("unable to create application");

    // prints "Using built-in logger: false" "Goodbye!"
    application.run().expect("error running application");
}
