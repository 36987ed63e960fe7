use autowire_di::instance_provider::{ComponentInstancePtr, TypedComponentInstanceProvider};
use autowire_di::provider::ProviderBuilder;
use autowire_di::{component_alias, injectable, Component};

// this is a trait we would like to use in our component
#[injectable]
trait TestTrait {
    fn foo(&self);
}

// this is a dependency which implements the above trait and also is an injectable component
#[derive(Component)]
struct TestDependency;

// we're telling the container TestDependency can be bound to dyn TestTrait
#[component_alias]
impl TestTrait for TestDependency {
    fn foo(&self) {
        println!("Hello world!");
    }
}

// this is another component, but with a dependency
#[derive(Component)]
struct TestComponent {
    // the container will inject whatever is bound to dyn TestTrait when asked for TestComponent
    dependency: ComponentInstancePtr<dyn TestTrait + Send + Sync>,
    // alternatively, you can inject the concrete type, if it's bound to itself
    // dependency: ComponentInstancePtr<TestDependency>,
}

impl TestComponent {
    fn call_foo(&self) {
        self.dependency.foo();
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // bindings are registered explicitly - the first binding for a given abstraction wins
    let provider = ProviderBuilder::new()
        .with_singleton::<dyn TestTrait + Send + Sync, TestDependency>()
        .with_transient::<TestComponent, TestComponent>()
        .build();

    let component = provider
        .resolve::<TestComponent>()
        .expect("error creating TestComponent");

    // prints "Hello world!"
    component.call_foo();
}
