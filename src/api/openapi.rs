use crate::api::handlers::{health, login, users};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Documented routes. Anything registered here is served and described in
/// the `OpenAPI` document; `/` and `OPTIONS /health` are added outside.
pub(crate) fn api_router() -> OpenApiRouter {
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(users::register))
        .routes(routes!(users::change_password))
        .routes(routes!(login::login))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(non_empty(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = non_empty(env!("CARGO_PKG_AUTHORS")).map(author_contact);
    info.license = non_empty(env!("CARGO_PKG_LICENSE")).map(|id| {
        let mut license = License::new(id);
        license.identifier = Some(id.to_string());
        license
    });

    let mut users_tag = Tag::new("users");
    users_tag.description = Some("Accounts and password checks".to_string());
    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Liveness and user store reachability".to_string());

    OpenApiBuilder::new()
        .info(info)
        .tags(Some(vec![users_tag, health_tag]))
        .build()
}

fn non_empty(value: &'static str) -> Option<&'static str> {
    Some(value.trim()).filter(|value| !value.is_empty())
}

// "Name <email>", only the first of several `:`-separated authors is used
fn author_contact(authors: &str) -> Contact {
    let primary = authors.split(':').next().unwrap_or_default().trim();
    let mut contact = Contact::new();

    match primary.split_once('<') {
        Some((name, email)) => {
            contact.name = Some(name.trim().to_string()).filter(|name| !name.is_empty());
            contact.email = Some(email.trim_end_matches('>').trim().to_string())
                .filter(|email| !email.is_empty());
        }
        None => contact.name = Some(primary.to_string()),
    }

    contact
}
