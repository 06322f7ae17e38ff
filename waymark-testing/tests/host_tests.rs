//! Integration tests for waymark-testing

use std::sync::Arc;
use waymark_core::{
    ActionDescriptorCollectionProvider, ActionDescriptorProvider, ApiBehaviorOptions,
    BindingSource, ChangeSource, HttpMethod,
};
use waymark_testing::*;

fn orders() -> ControllerTypeBuilder {
    ControllerTypeBuilder::new("Orders")
        .namespace("Shop.Api")
        .api()
        .route("api/[controller]")
        .action(MethodBuilder::new("Get").get("{id}").param(ParameterBuilder::int("id")))
        .action(
            MethodBuilder::new("Create")
                .post("")
                .param(ParameterBuilder::complex("order", "OrderDto")),
        )
}

#[test]
fn test_api_controller_through_host() {
    let host = TestHost::builder().controller(orders().build()).build();
    let descriptors = host.descriptors().unwrap();
    assert_eq!(descriptors.len(), 2);

    let get = expect_descriptor(&descriptors, "Orders.Get");
    assert_template(get, "api/Orders/{id}");
    assert_eq!(
        get.parameters[0].binding_info.as_ref().and_then(|b| b.binding_source),
        Some(BindingSource::Path)
    );

    let create = expect_descriptor(&descriptors, "Orders.Create");
    assert_template(create, "api/Orders");
    assert_eq!(
        create.parameters[0].binding_info.as_ref().and_then(|b| b.binding_source),
        Some(BindingSource::Body)
    );
    assert_route_keys_uniform(&descriptors);
}

#[test]
fn test_suppressed_inference_leaves_sources_unset() {
    let host = TestHost::builder()
        .controller(orders().build())
        .api_options(ApiBehaviorOptions {
            suppress_infer_binding_sources_for_parameters: true,
            ..Default::default()
        })
        .build();
    let descriptors = host.descriptors().unwrap();
    let create = expect_descriptor(&descriptors, "Orders.Create");
    assert_eq!(
        create.parameters[0].binding_info.as_ref().and_then(|b| b.binding_source),
        None
    );
}

#[test]
fn test_conventional_selection_with_areas() {
    let host = TestHost::builder()
        .controller(ControllerTypeBuilder::new("Home").action(MethodBuilder::new("Index")).build())
        .controller(
            ControllerTypeBuilder::new("Dashboard")
                .area("Admin")
                .action(MethodBuilder::new("Index").accepts(HttpMethod::Get))
                .build(),
        )
        .build();

    let descriptors = host.descriptors().unwrap();
    assert_route_keys_uniform(&descriptors);
    let home = expect_descriptor(&descriptors, "Home.Index");
    assert_conventional(home);
    assert_route_value(home, "area", None);

    let admin = host
        .select(&[("area", "admin"), ("controller", "dashboard"), ("action", "index")], "GET")
        .unwrap()
        .unwrap();
    assert_eq!(admin.controller_name, "Dashboard");

    let missing = host
        .select(&[("area", "admin"), ("controller", "dashboard"), ("action", "index")], "POST")
        .unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_descriptor_provider_order() {
    let log = CallLog::new();
    let late: Arc<dyn ActionDescriptorProvider> = Arc::new(RecordingProvider::new("late", 10, log.clone()));
    let early: Arc<dyn ActionDescriptorProvider> = Arc::new(RecordingProvider::new("early", 0, log.clone()));

    let host = TestHost::builder()
        .controller(ControllerTypeBuilder::new("Home").action(MethodBuilder::new("Index")).build())
        .provider(late)
        .provider(early)
        .build();
    host.descriptors().unwrap();

    assert_eq!(
        log.calls(),
        ["early:executing", "late:executing", "late:executed", "early:executed"]
    );
}

#[test]
fn test_manual_change_source_drives_rebuilds() {
    let log = CallLog::new();
    let source = Arc::new(ManualChangeSource::new());
    let recording: Arc<dyn ActionDescriptorProvider> = Arc::new(RecordingProvider::new("only", 0, log.clone()));
    let provider = ActionDescriptorCollectionProvider::new(
        vec![recording],
        Arc::clone(&source) as Arc<dyn ChangeSource>,
    );

    provider.action_descriptors().unwrap();
    provider.action_descriptors().unwrap();
    assert_eq!(log.call_count(), 2);

    source.bump();
    let rebuilt = provider.action_descriptors().unwrap();
    assert_eq!(log.call_count(), 4);
    assert_eq!(rebuilt.version, 2);
    assert!(rebuilt.is_empty());
}

#[test]
fn test_part_changes_are_picked_up() {
    let host = TestHost::builder()
        .controller(ControllerTypeBuilder::new("Home").action(MethodBuilder::new("Index")).build())
        .build();
    assert_eq!(host.descriptors().unwrap().len(), 1);

    host.manager().add_part(
        waymark_core::ApplicationPart::new("Extra")
            .with_type(ControllerTypeBuilder::new("Status").action(MethodBuilder::new("Ping")).build()),
    );
    let descriptors = host.descriptors().unwrap();
    assert_eq!(descriptors.len(), 2);
    assert!(find_descriptor(&descriptors, "Status.Ping").is_some());
}
