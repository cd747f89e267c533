mod organization_service;

pub use organization_service::OrganizationService;
