mod communication_service;

pub use communication_service::CommunicationService;
