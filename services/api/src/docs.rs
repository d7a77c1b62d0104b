use property_ledger::properties::{
    ErrorResponse, FieldViolation, NewProperty, Pagination, PriceComparison, Property,
    PropertySearchResponse, PropertyWithComparison,
};
use utoipa::OpenApi;

use crate::routes::HealthStatus;

/// OpenAPI description of the public HTTP surface, generated from the handler
/// annotations and the wire types.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Property Listing API",
        description = "Add property sales and search them with suburb-based price comparisons"
    ),
    paths(
        crate::routes::healthcheck,
        property_ledger::properties::router::create_handler,
        property_ledger::properties::router::search_handler
    ),
    components(schemas(
        HealthStatus,
        NewProperty,
        Property,
        PropertyWithComparison,
        PriceComparison,
        PropertySearchResponse,
        Pagination,
        ErrorResponse,
        FieldViolation
    )),
    tags(
        (name = "properties", description = "Property sales and suburb price comparisons"),
        (name = "operations", description = "Service health")
    )
)]
pub(crate) struct ApiDoc;
