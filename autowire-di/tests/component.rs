#[cfg(feature = "derive")]
mod component_derive_test {
    use autowire_di::component::{Component, ComponentDowncast};
    use autowire_di::constructor::{Constructor, ParameterKind};
    use autowire_di::instance_provider::{
        ComponentInstanceAnyPtr, ComponentInstancePtr, ServiceKey, TypedComponentInstanceProvider,
    };
    use autowire_di::provider::ProviderBuilder;
    use autowire_di::{component_alias, injectable, Component};

    #[injectable]
    trait TestTrait {
        fn value(&self) -> i8;
    }

    #[derive(Component)]
    struct TestDependency;

    #[component_alias]
    impl TestTrait for TestDependency {
        fn value(&self) -> i8 {
            5
        }
    }

    fn dummy_expr() -> i8 {
        -1
    }

    #[derive(Component)]
    struct TestComponent {
        dependency: ComponentInstancePtr<dyn TestTrait + Send + Sync>,
        optional_dependency: Option<ComponentInstancePtr<TestDependency>>,
        port: u16,
        name: String,
        #[component(default)]
        retries: u8,
        #[component(default = "dummy_expr")]
        offset: i8,
    }

    #[derive(Component)]
    struct TestTupleComponent(
        ComponentInstancePtr<TestDependency>,
        #[component(default = "dummy_expr")] i8,
    );

    #[derive(Component)]
    #[component(constructors = "TestMultiComponent::available_constructors")]
    struct TestMultiComponent {
        dependency: Option<ComponentInstancePtr<TestDependency>>,
    }

    impl TestMultiComponent {
        fn available_constructors() -> Vec<Constructor<Self>> {
            vec![
                Constructor::new(|_| Ok(Self { dependency: None })),
                Constructor::new(|arguments| {
                    Ok(Self {
                        dependency: Some(arguments.service()?),
                    })
                })
                .with_service::<TestDependency>(),
            ]
        }
    }

    #[test]
    fn should_generate_parameters_in_field_order() {
        let constructors = TestComponent::constructors();
        assert_eq!(constructors.len(), 1);

        let parameters = constructors[0].parameters();
        let kinds: Vec<_> = parameters
            .iter()
            .map(|parameter| (parameter.key, parameter.kind, parameter.is_optional()))
            .collect();

        assert_eq!(
            kinds,
            vec![
                (
                    ServiceKey::of::<dyn TestTrait + Send + Sync>(),
                    ParameterKind::Service,
                    false
                ),
                (
                    ServiceKey::of::<TestDependency>(),
                    ParameterKind::Service,
                    true
                ),
                (ServiceKey::of::<u16>(), ParameterKind::Value, false),
                (ServiceKey::of::<String>(), ParameterKind::Text, false),
                (ServiceKey::of::<u8>(), ParameterKind::Value, true),
                (ServiceKey::of::<i8>(), ParameterKind::Value, true),
            ]
        );
    }

    #[test]
    fn should_construct_derived_component() {
        let provider = ProviderBuilder::new()
            .with_singleton::<dyn TestTrait + Send + Sync, TestDependency>()
            .with_instance(8080u16)
            .with_instance("service".to_string())
            .with_transient::<TestComponent, TestComponent>()
            .build();

        let component = provider.resolve::<TestComponent>().unwrap();

        assert_eq!(component.dependency.value(), 5);
        assert!(component.optional_dependency.is_none());
        assert_eq!(component.port, 8080);
        assert_eq!(component.name, "service");
        assert_eq!(component.retries, 0);
        assert_eq!(component.offset, -1);
    }

    #[test]
    fn should_construct_tuple_component() {
        let provider = ProviderBuilder::new()
            .with_singleton::<TestDependency, TestDependency>()
            .with_instance(3i8)
            .with_transient::<TestTupleComponent, TestTupleComponent>()
            .build();

        let component = provider.resolve::<TestTupleComponent>().unwrap();
        assert_eq!(component.1, 3);
    }

    #[test]
    fn should_use_custom_constructors() {
        assert_eq!(TestMultiComponent::constructors().len(), 2);

        let provider = ProviderBuilder::new()
            .with_transient::<TestMultiComponent, TestMultiComponent>()
            .build();
        assert!(provider
            .resolve::<TestMultiComponent>()
            .unwrap()
            .dependency
            .is_none());

        let provider = ProviderBuilder::new()
            .with_singleton::<TestDependency, TestDependency>()
            .with_transient::<TestMultiComponent, TestMultiComponent>()
            .build();
        assert!(provider
            .resolve::<TestMultiComponent>()
            .unwrap()
            .dependency
            .is_some());
    }

    #[test]
    fn should_downcast_to_alias() {
        let instance = ComponentInstancePtr::new(TestDependency) as ComponentInstanceAnyPtr;
        let alias = <dyn TestTrait + Send + Sync as ComponentDowncast<TestDependency>>::downcast(
            instance,
        )
        .ok()
        .unwrap();

        assert_eq!(alias.value(), 5);
    }
}
