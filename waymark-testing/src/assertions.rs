// Assertions over published descriptors

use waymark_core::{ActionDescriptor, ActionDescriptorCollection};

/// Find a descriptor by `Controller.Action` or by display name.
pub fn find_descriptor<'a>(
    collection: &'a ActionDescriptorCollection,
    name: &str,
) -> Option<&'a ActionDescriptor> {
    collection.iter().find(|d| {
        d.display_name == name || format!("{}.{}", d.controller_name, d.action_name) == name
    })
}

/// Like [`find_descriptor`], panicking with the known names if missing.
pub fn expect_descriptor<'a>(
    collection: &'a ActionDescriptorCollection,
    name: &str,
) -> &'a ActionDescriptor {
    match find_descriptor(collection, name) {
        Some(descriptor) => descriptor,
        None => {
            let known: Vec<&str> = collection.iter().map(|d| d.display_name.as_str()).collect();
            panic!("No descriptor named '{}'. Known: {:?}", name, known)
        }
    }
}

/// Assert that every descriptor carries the same set of route keys.
pub fn assert_route_keys_uniform(collection: &ActionDescriptorCollection) {
    let mut expected: Option<(Vec<String>, &str)> = None;
    for descriptor in collection.iter() {
        let mut keys: Vec<String> = descriptor
            .route_values
            .keys()
            .map(|k| k.to_ascii_lowercase())
            .collect();
        keys.sort();

        match &expected {
            None => expected = Some((keys, descriptor.display_name.as_str())),
            Some((first, first_name)) => assert_eq!(
                &keys, first,
                "Route keys of '{}' differ from those of '{}'",
                descriptor.display_name, first_name
            ),
        }
    }
}

/// Assert the attribute route template of a descriptor.
pub fn assert_template(descriptor: &ActionDescriptor, expected: &str) {
    let actual = descriptor
        .attribute_route_info
        .as_ref()
        .map(|i| i.template.as_str());
    assert_eq!(
        actual,
        Some(expected),
        "Expected '{}' to be routed at '{}', got {:?}",
        descriptor.display_name,
        expected,
        actual
    );
}

/// Assert that a descriptor is conventionally routed.
pub fn assert_conventional(descriptor: &ActionDescriptor) {
    assert!(
        descriptor.attribute_route_info.is_none(),
        "Expected '{}' to be conventionally routed",
        descriptor.display_name
    );
}

/// Assert the route value stored under `key`.
pub fn assert_route_value(descriptor: &ActionDescriptor, key: &str, expected: Option<&str>) {
    let actual = descriptor.route_values.get(key);
    assert_eq!(
        actual, expected,
        "Expected route value '{}' of '{}' to be {:?}, got {:?}",
        key, descriptor.display_name, expected, actual
    );
}
