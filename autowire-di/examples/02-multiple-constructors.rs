// note: this example assumes you've analyzed the previous ones

use autowire_di::constructor::Constructor;
use autowire_di::instance_provider::{ComponentInstancePtr, TypedComponentInstanceProvider};
use autowire_di::provider::ProviderBuilder;
use autowire_di::Component;

#[derive(Component)]
struct Clock;

#[derive(Component)]
struct Metrics;

// components can expose more than one constructor - the container picks the one with the most
// parameters it can satisfy
#[derive(Component)]
#[component(constructors = "Scheduler::available_constructors")]
struct Scheduler {
    clock: Option<ComponentInstancePtr<Clock>>,
    metrics: Option<ComponentInstancePtr<Metrics>>,
}

impl Scheduler {
    fn available_constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new(|_| {
                Ok(Self {
                    clock: None,
                    metrics: None,
                })
            }),
            Constructor::new(|arguments| {
                Ok(Self {
                    clock: Some(arguments.service()?),
                    metrics: None,
                })
            })
            .with_service::<Clock>(),
            // uncommenting this constructor makes resolution fail, since two constructors with
            // the same number of parameters could be used and the container refuses to guess
            // Constructor::new(|arguments| {
            //     Ok(Self {
            //         clock: None,
            //         metrics: Some(arguments.service()?),
            //     })
            // })
            // .with_service::<Metrics>(),
        ]
    }

    fn describe(&self) {
        println!(
            "clock: {}, metrics: {}",
            self.clock.is_some(),
            self.metrics.is_some()
        );
    }
}

fn main() {
    let provider = ProviderBuilder::new()
        .with_transient::<Scheduler, Scheduler>()
        .build();

    // prints "clock: false, metrics: false"
    provider.resolve::<Scheduler>().unwrap().describe();

    let provider = ProviderBuilder::new()
        .with_singleton::<Clock, Clock>()
        .with_singleton::<Metrics, Metrics>()
        .with_transient::<Scheduler, Scheduler>()
        .build();

    // prints "clock: true, metrics: false"
    provider.resolve::<Scheduler>().unwrap().describe();
}
