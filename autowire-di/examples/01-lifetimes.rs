// note: this example assumes you've analyzed the previous one

use autowire_di::binding::Lifetime;
use autowire_di::component::Disposable;
use autowire_di::instance_provider::{
    ComponentInstancePtr, ErrorPtr, TypedComponentInstanceProvider,
};
use autowire_di::provider::{ProviderBuilder, ServiceProvider};
use autowire_di::Component;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}

// singletons are created once per root provider
#[derive(Component)]
struct Database;

impl Disposable for Database {
    fn dispose(&self) -> Result<(), ErrorPtr> {
        println!("Database disposed!");
        Ok(())
    }
}

// scoped components are created once per scope, e.g. once per request
#[derive(Component)]
struct Request {
    // not registered, so a new id is generated for each instance
    #[component(default = "next_id")]
    id: usize,
    database: ComponentInstancePtr<Database>,
}

impl Disposable for Request {
    fn dispose(&self) -> Result<(), ErrorPtr> {
        println!("Request {} disposed!", self.id);
        Ok(())
    }
}

fn main() {
    // only disposable registrations get disposed along with their provider
    let provider = ProviderBuilder::new()
        .with_disposable::<Database, Database>(Lifetime::Singleton)
        .with_disposable::<Request, Request>(Lifetime::Scoped)
        .build();

    // scoped components cannot be resolved from the root provider
    assert!(provider.resolve::<Request>().is_err());

    {
        let first_scope = provider.create_scope();
        let second_scope = provider.create_scope();

        let first = first_scope.resolve::<Request>().unwrap();
        let second = second_scope.resolve::<Request>().unwrap();

        // prints "1 1 2"
        println!(
            "{} {} {}",
            first.id,
            first_scope.resolve::<Request>().unwrap().id,
            second.id
        );

        // both requests share the same database
        assert!(ComponentInstancePtr::ptr_eq(
            &first.database,
            &second.database
        ));

        // prints "Request 2 disposed!" "Request 1 disposed!" when scopes get dropped
    }

    // prints "Database disposed!"
    provider.dispose();
}
