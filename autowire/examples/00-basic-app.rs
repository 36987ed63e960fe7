use autowire::application::Application;
use autowire::runner::ApplicationRunner;
use autowire_di::binding::{Binding, Lifetime};
use autowire_di::instance_provider::{ComponentInstancePtr, ErrorPtr};
use autowire_di::{component_alias, injectable, Component};

#[injectable]
trait Greeter {
    fn greet(&self) -> String;
}

#[derive(Component)]
struct WorldGreeter;

#[component_alias]
impl Greeter for WorldGreeter {
    fn greet(&self) -> String {
        "Hello world!".to_string()
    }
}

// runners contain the actual application logic and are components themselves, so they can
// depend on other components
#[derive(Component)]
struct HelloRunner {
    greeter: ComponentInstancePtr<dyn Greeter + Send + Sync>,
}

impl ApplicationRunner for HelloRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("{}", self.greeter.greet());
        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // the configuration is read from the environment and "autowire.json", if present
    let application = Application::builder()
        .with_binding(Binding::new::<dyn Greeter + Send + Sync, WorldGreeter>(
            Lifetime::Singleton,
        ))
        .with_runner::<HelloRunner>()
        .build()
        .expect("unable to create application");

    // prints "Hello world!"
    application.run().expect("error running application");
}
