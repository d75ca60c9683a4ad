//! Test fixtures: a scripted slice of real-world geography and resource
//! payloads shaped like the directory's own seed data.

#![allow(dead_code)]

use directory_core::common::DirectoryResult;
use directory_core::domains::resources::{create_resource, CreateResource, Resource};
use directory_core::kernel::{DirectoryDeps, MockGeocoder, Place, PlaceKind};

/// Geocoder answers for the places the tests resolve
pub fn us_geography() -> MockGeocoder {
    MockGeocoder::new()
        .with_country("USA")
        .with_state("California", "USA")
        .with_state("Washington", "USA")
        .with_state("Hawaii", "USA")
        .with_city("Berkeley", "California", "USA")
        .with_city("Davis", "California", "USA")
        .with_city("Seattle", "Washington", "USA")
        .with_city("Honolulu", "Hawaii", "USA")
        .with_place(
            "UC Berkeley",
            Place {
                kind: PlaceKind::University,
                country: Some("USA".to_string()),
                state: Some("California".to_string()),
                city: Some("Berkeley".to_string()),
            },
        )
        .with_place(
            "Alameda County",
            Place {
                kind: PlaceKind::Administrative,
                country: Some("USA".to_string()),
                state: Some("California".to_string()),
                city: None,
            },
        )
        .with_place(
            "Mount Rainier",
            Place {
                kind: PlaceKind::Other("peak".to_string()),
                country: Some("USA".to_string()),
                state: Some("Washington".to_string()),
                city: None,
            },
        )
}

fn list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// A resource payload with the fields every test cares about
pub fn resource(title: &str, location: &str, types: &str, audiences: &str) -> CreateResource {
    CreateResource {
        title: title.to_string(),
        url: "something.com".to_string(),
        contact_email: "something@gmail.com".to_string(),
        location: location.to_string(),
        description: Some("descriptions".to_string()),
        types: list(types),
        audiences: list(audiences),
        ..Default::default()
    }
}

pub async fn create_all(
    deps: &DirectoryDeps,
    inputs: Vec<CreateResource>,
) -> DirectoryResult<Vec<Resource>> {
    let mut created = Vec::with_capacity(inputs.len());
    for input in inputs {
        created.push(create_resource(input, deps).await?);
    }
    Ok(created)
}

/// Four resources spread over types, all open to the same audiences
pub async fn seed_typed_resources(deps: &DirectoryDeps) -> DirectoryResult<Vec<Resource>> {
    create_all(
        deps,
        vec![
            resource("thing1", "Global", "Scholarship,Funding,Events,Networking", "Grad,Undergrad"),
            resource("thing2", "Global", "Scholarship,Funding,Events,Networking", "Grad,Undergrad"),
            resource("thing3", "Global", "Scholarship,Events,Networking", "Grad,Undergrad"),
            resource("thing4", "someplace", "Funding,Mentoring", "Grad,Undergrad"),
        ],
    )
    .await
}

/// Five resources at different levels of the location tree
pub async fn seed_located_resources(deps: &DirectoryDeps) -> DirectoryResult<Vec<Resource>> {
    create_all(
        deps,
        vec![
            resource("thing1", "Global", "Scholarship,Funding,Events,Networking", "Grad,Undergrad"),
            resource("thing2", "Berkeley", "Scholarship,Funding,Mentoring", "Grad,Undergrad"),
            resource("thing3", "USA", "Scholarship,Funding,Events,Networking", "Grad,Undergrad"),
            resource("thing4", "California", "Funding,Mentoring", "Grad,Undergrad"),
            resource("thing5", "Seattle", "Funding,Mentoring", "Grad,Undergrad"),
        ],
    )
    .await
}

/// Titles of `resources`, sorted
pub fn titles(resources: &[Resource]) -> Vec<String> {
    let mut titles: Vec<String> = resources.iter().map(|r| r.title.clone()).collect();
    titles.sort();
    titles
}
