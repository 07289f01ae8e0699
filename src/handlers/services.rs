use axum::extract::Query;
use axum::extract::rejection::QueryRejection;

use crate::error::{Failure, FieldViolation};
use crate::models::{PageQuery, ServiceOffering};
use crate::response::{ApiResponse, Pagination};

pub const SERVICES: &[ServiceOffering] = &[
    ServiceOffering {
        slug: "web-design",
        name: "Web Design",
        summary: "Responsive marketing sites built around your brand.",
    },
    ServiceOffering {
        slug: "web-development",
        name: "Web Development",
        summary: "Custom web applications, from prototype to production.",
    },
    ServiceOffering {
        slug: "ecommerce",
        name: "E-commerce",
        summary: "Storefronts, checkout flows and payment integrations.",
    },
    ServiceOffering {
        slug: "seo",
        name: "Search Engine Optimization",
        summary: "Technical audits and content strategy that rank.",
    },
    ServiceOffering {
        slug: "branding",
        name: "Branding",
        summary: "Logos, visual identity and style guides.",
    },
    ServiceOffering {
        slug: "hosting",
        name: "Managed Hosting",
        summary: "Monitored hosting with backups and security updates.",
    },
    ServiceOffering {
        slug: "maintenance",
        name: "Maintenance",
        summary: "Ongoing updates, fixes and performance tuning.",
    },
    ServiceOffering {
        slug: "consulting",
        name: "Consulting",
        summary: "Architecture reviews and technology roadmaps.",
    },
];

pub async fn list_services_handler(
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<ServiceOffering>>, Failure> {
    let Query(query) = query.map_err(|rejection| {
        Failure::Validation(vec![FieldViolation::new("query", rejection.body_text())])
    })?;

    let page = query.page();
    let limit = query.limit();
    let offset = (page as usize - 1).saturating_mul(limit as usize);

    let items: Vec<ServiceOffering> = SERVICES
        .iter()
        .skip(offset)
        .take(limit as usize)
        .cloned()
        .collect();

    Ok(ApiResponse::success(
        items,
        Some(Pagination::new(page, limit, SERVICES.len() as u64)),
    ))
}
